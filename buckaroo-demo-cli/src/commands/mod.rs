//! Command implementations

pub mod inspect;
pub mod reference;
pub mod signing;
pub mod status;

use std::io::Read;

use anyhow::{Context, Result};

/// Global output flags.
#[derive(Clone, Copy, Debug)]
pub struct Output {
    pub json: bool,
    pub verbose: bool,
}

/// Read a body argument, where `-` means stdin.
pub fn read_body(arg: &str) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }

    let mut body = String::new();
    std::io::stdin()
        .read_to_string(&mut body)
        .context("Failed to read body from stdin")?;
    Ok(body.trim_end().to_string())
}
