/*
 *  display/factory.rs
 *
 *  PlexRadio - turn it up
 *  (c) 2020-26 Stuart Hunter
 *
 *  Factory for display drivers - construction and init as one fallible step
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use crate::config::{DisplayConfig, DriverKind};
use crate::display::drivers::MockDriver;
use crate::display::error::DisplayFactoryError;
use crate::display::traits::DisplayDriver;
use log::{debug, info};

#[cfg(feature = "driver-hd44780")]
use crate::display::drivers::Hd44780Driver;

/// Type alias for boxed display driver trait objects
pub type BoxedDriver = Box<dyn DisplayDriver>;

/// Largest character grid the HD44780 controller can address
const HD44780_MAX: (usize, usize) = (40, 4);

/// Factory for creating display drivers from configuration
pub struct DisplayDriverFactory;

impl DisplayDriverFactory {
    /// Create and initialize a display driver from configuration
    ///
    /// With `hardware_enabled` false the mock driver is always selected, that
    /// is a requested mode and not a failure. A disabled display section
    /// yields `DisplayFactoryError::Disabled` so the caller can fall back.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let config = DisplayConfig {
    ///     driver: Some(DriverKind::Hd44780),
    ///     ..Default::default()
    /// };
    ///
    /// let driver = DisplayDriverFactory::create_from_config(&config, true)?;
    /// ```
    pub fn create_from_config(
        config: &DisplayConfig,
        hardware_enabled: bool,
    ) -> Result<BoxedDriver, DisplayFactoryError> {
        if !config.enabled() {
            return Err(DisplayFactoryError::Disabled);
        }
        Self::validate_config(config)?;

        let (columns, rows) = (config.width(), config.height());
        let kind = if hardware_enabled { config.driver() } else { DriverKind::Mock };
        debug!("Creating {:?} display driver ({}x{})", kind, columns, rows);

        let driver: BoxedDriver = match kind {
            DriverKind::Mock => Box::new(MockDriver::new(columns, rows)),

            #[cfg(feature = "driver-hd44780")]
            DriverKind::Hd44780 => {
                let bus = config.bus();
                Box::new(Hd44780Driver::new_i2c(&bus.bus(), bus.address(), columns, rows)?)
            }

            #[cfg(not(feature = "driver-hd44780"))]
            DriverKind::Hd44780 => {
                return Err(DisplayFactoryError::DriverNotEnabled(
                    "HD44780 (enable with --features driver-hd44780)".to_string(),
                ));
            }
        };

        Self::initialize(driver)
    }

    /// Run `init` on a freshly constructed driver
    pub fn initialize(mut driver: BoxedDriver) -> Result<BoxedDriver, DisplayFactoryError> {
        driver.init()?;
        info!(
            "Display ready: {} {}x{}",
            driver.capabilities().name,
            driver.capabilities().columns,
            driver.capabilities().rows
        );
        Ok(driver)
    }

    /// Validate a configuration without creating a driver
    ///
    /// This is useful for checking configuration at startup before attempting
    /// to initialize hardware.
    pub fn validate_config(config: &DisplayConfig) -> Result<(), DisplayFactoryError> {
        let (columns, rows) = (config.width(), config.height());
        if columns == 0 || rows == 0 {
            return Err(DisplayFactoryError::ConfigError(
                format!("Invalid geometry {}x{}", columns, rows)
            ));
        }
        if config.driver() == DriverKind::Hd44780
            && (columns > HD44780_MAX.0 || rows > HD44780_MAX.1)
        {
            return Err(DisplayFactoryError::ConfigError(format!(
                "HD44780 supports at most {}x{}, got {}x{}",
                HD44780_MAX.0, HD44780_MAX.1, columns, rows
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_display() {
        let config = DisplayConfig {
            enabled: Some(false),
            ..Default::default()
        };
        assert!(matches!(
            DisplayDriverFactory::create_from_config(&config, true),
            Err(DisplayFactoryError::Disabled)
        ));
    }

    #[test]
    fn test_hardware_disabled_selects_mock() {
        let config = DisplayConfig {
            driver: Some(DriverKind::Hd44780),
            width: Some(20),
            height: Some(4),
            ..Default::default()
        };
        let driver = DisplayDriverFactory::create_from_config(&config, false).unwrap();
        assert_eq!(driver.capabilities().name, "mock");
        assert_eq!(driver.dimensions(), (20, 4));
    }

    #[test]
    fn test_validate_config_oversized_lcd() {
        let config = DisplayConfig {
            driver: Some(DriverKind::Hd44780),
            width: Some(80),
            ..Default::default()
        };
        assert!(DisplayDriverFactory::validate_config(&config).is_err());

        let config = DisplayConfig {
            driver: Some(DriverKind::Mock),
            width: Some(80),
            ..Default::default()
        };
        assert!(DisplayDriverFactory::validate_config(&config).is_ok());
    }

    #[test]
    fn test_initialize_reports_init_failure() {
        let driver: BoxedDriver = Box::new(MockDriver::failing(16, 2));
        assert!(matches!(
            DisplayDriverFactory::initialize(driver),
            Err(DisplayFactoryError::DriverInitFailed(_))
        ));
    }
}
