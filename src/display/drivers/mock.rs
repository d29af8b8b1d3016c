/*
 *  display/drivers/mock.rs
 *
 *  PlexRadio - turn it up
 *  (c) 2020-26 Stuart Hunter
 *
 *  Software display driver - fail-safe fallback and test double
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

use log::debug;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::display::error::DisplayError;
use crate::display::traits::{DisplayCapabilities, DisplayDriver};

/// Software display driver
///
/// This driver keeps the display content in memory. It is used:
/// - as the fail-safe substitute when the hardware display cannot be brought up
/// - on desktops without an I2C bus
/// - in unit and integration tests
///
/// All operations are recorded in a shared state so tests can inspect what
/// was written after the driver has been boxed and handed to the manager.
#[derive(Debug, Clone)]
pub struct MockDriver {
    /// Display capabilities
    capabilities: DisplayCapabilities,

    /// Shared state for inspection
    state: Arc<Mutex<MockDriverState>>,
}

/// Internal state for the mock driver (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockDriverState {
    /// Current content, one entry per row
    pub lines: Vec<String>,

    /// Number of times init() was called
    pub init_count: usize,

    /// Number of times clear() was called
    pub clear_count: usize,

    /// Number of display_text() calls
    pub write_count: usize,

    /// Number of times flush() was called
    pub flush_count: usize,

    /// Whether the driver is initialized
    pub is_initialized: bool,

    /// Simulate failures (for error testing)
    pub simulate_init_failure: bool,
    pub simulate_write_failure: bool,
}

impl MockDriver {
    /// Create a mock driver with specific dimensions
    pub fn new(columns: usize, rows: usize) -> Self {
        let capabilities = DisplayCapabilities::new("mock", columns, rows);
        let state = MockDriverState {
            lines: vec![String::new(); rows],
            ..Default::default()
        };
        debug!("Mock display initialized: {}x{}", columns, rows);
        Self {
            capabilities,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Mock driver whose init() fails, used to exercise the fallback path
    pub fn failing(columns: usize, rows: usize) -> Self {
        let driver = Self::new(columns, rows);
        driver.lock().simulate_init_failure = true;
        driver
    }

    /// Get reference to state for inspection
    pub fn state(&self) -> Arc<Mutex<MockDriverState>> {
        Arc::clone(&self.state)
    }

    /// Snapshot of the current rows
    pub fn lines(&self) -> Vec<String> {
        self.lock().lines.clone()
    }

    // a panicking test must not take the fallback display down with it
    fn lock(&self) -> MutexGuard<'_, MockDriverState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DisplayDriver for MockDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        let mut state = self.lock();

        if state.simulate_init_failure {
            return Err(DisplayError::InitializationFailed("Simulated init failure".to_string()));
        }

        state.init_count += 1;
        state.is_initialized = true;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        let rows = self.capabilities.rows;
        let mut state = self.lock();
        state.clear_count += 1;
        state.lines = vec![String::new(); rows];
        Ok(())
    }

    fn display_text(&mut self, text: &str, line: usize) -> Result<(), DisplayError> {
        let rows = self.capabilities.rows;
        if line == 0 || line > rows {
            return Err(DisplayError::InvalidLine { line, rows });
        }

        let mut state = self.lock();
        if state.simulate_write_failure {
            return Err(DisplayError::Other("Simulated write failure".to_string()));
        }

        let clipped: String = text.chars().take(self.capabilities.columns).collect();
        debug!("Line {}: '{}'", line, clipped);
        state.lines[line - 1] = clipped;
        state.write_count += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.lock().flush_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_driver_creation() {
        let driver = MockDriver::new(16, 2);
        assert_eq!(driver.dimensions(), (16, 2));
        assert_eq!(driver.lines(), vec![String::new(), String::new()]);
    }

    #[test]
    fn test_mock_driver_init() {
        let mut driver = MockDriver::new(16, 2);

        let state = driver.state();
        assert_eq!(state.lock().unwrap().init_count, 0);
        assert!(!state.lock().unwrap().is_initialized);

        driver.init().unwrap();

        assert_eq!(state.lock().unwrap().init_count, 1);
        assert!(state.lock().unwrap().is_initialized);
    }

    #[test]
    fn test_mock_driver_write_and_clear() {
        let mut driver = MockDriver::new(16, 2);

        driver.display_text("Classic Rock", 1).unwrap();
        driver.display_text("a line that is far too long", 2).unwrap();
        assert_eq!(driver.lines()[0], "Classic Rock");
        assert_eq!(driver.lines()[1], "a line that is f");

        driver.clear().unwrap();
        assert_eq!(driver.lines(), vec![String::new(), String::new()]);
        assert_eq!(driver.state().lock().unwrap().clear_count, 1);
        assert_eq!(driver.state().lock().unwrap().write_count, 2);
    }

    #[test]
    fn test_mock_driver_rejects_bad_line() {
        let mut driver = MockDriver::new(16, 2);
        assert!(driver.display_text("x", 0).is_err());
        assert!(driver.display_text("x", 3).is_err());
    }

    #[test]
    fn test_mock_driver_simulated_failure() {
        let mut driver = MockDriver::failing(20, 4);
        assert!(driver.init().is_err());

        driver.state().lock().unwrap().simulate_init_failure = false;
        assert!(driver.init().is_ok());
    }
}
