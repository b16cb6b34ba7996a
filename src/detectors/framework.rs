//! detectors/framework.rs
//!
//! Canonical test framework per language.

use std::fmt;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TestFramework {
    Pytest,
    Jest,
    JUnit,
    GoogleTest,
    NUnit,
    GoTesting,
    Unknown,
}

impl TestFramework {
    pub fn label(self) -> &'static str {
        match self {
            TestFramework::Pytest => "pytest",
            TestFramework::Jest => "jest",
            TestFramework::JUnit => "JUnit",
            TestFramework::GoogleTest => "Google Test",
            TestFramework::NUnit => "NUnit",
            TestFramework::GoTesting => "testing",
            TestFramework::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TestFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
