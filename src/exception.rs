// exception.rs -- conversion errors

use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub struct InvalidData {
    pub value: String,
    pub category: Option<String>,
}

impl InvalidData {
    pub fn new(value: &str, category: Option<String>) -> Self {
        InvalidData {
            value: value.to_string(),
            category,
        }
    }
}

impl fmt::Display for InvalidData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid data: {}", self.value)
    }
}

impl Error for InvalidData {}

#[derive(Debug)]
pub struct InvalidRequirement {
    pub value: String,
    pub category: Option<String>,
}

impl InvalidRequirement {
    pub fn new(value: &str, category: Option<String>) -> Self {
        InvalidRequirement {
            value: value.to_string(),
            category,
        }
    }
}

impl fmt::Display for InvalidRequirement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid requirement: {}", self.value)
    }
}

impl Error for InvalidRequirement {}
