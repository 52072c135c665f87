// PinLab - GPIO Pin-State Matrix
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

pub mod matrix;
pub mod store;

use std::str::FromStr;


pub use matrix::PinMatrix;
pub use store::{CellStore, CountingStore, HeapStore};

#[derive(Debug, thiserror::Error)]
pub enum MatrixError {
    #[error("Cell storage allocation failed ({0} cells requested)")]
    OutOfMemory(usize),
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("Pin {pin} out of range (matrix has {pin_count} pins per port)")]
    PinOutOfRange { pin: usize, pin_count: usize },
}

pub type MatrixResult<T> = Result<T, MatrixError>;

/// Logical pin groups. Every matrix carries all four ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Port {
    #[serde(alias = "porta", alias = "gpioa")]
    A,
    #[serde(alias = "portb", alias = "gpiob")]
    B,
    #[serde(alias = "portc", alias = "gpioc")]
    C,
    #[serde(alias = "portd", alias = "gpiod")]
    D,
}

impl Port {
    pub const COUNT: usize = 4;
    pub const ALL: [Port; Port::COUNT] = [Port::A, Port::B, Port::C, Port::D];

    pub fn index(self) -> usize {
        match self {
            Port::A => 0,
            Port::B => 1,
            Port::C => 2,
            Port::D => 3,
        }
    }
}

impl FromStr for Port {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let v = value.trim().to_ascii_lowercase();
        match v.as_str() {
            "a" | "porta" | "gpioa" => Ok(Port::A),
            "b" | "portb" | "gpiob" => Ok(Port::B),
            "c" | "portc" | "gpioc" => Ok(Port::C),
            "d" | "portd" | "gpiod" => Ok(Port::D),
            _ => Err(format!("unknown port '{}'; supported: a, b, c, d", value)),
        }
    }
}

/// Role assigned to a pin within its port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinFunction {
    #[serde(alias = "out")]
    Output,
    #[serde(alias = "in")]
    Input,
    #[serde(alias = "alt", alias = "af")]
    Alternate,
}

impl PinFunction {
    pub const COUNT: usize = 3;
    pub const ALL: [PinFunction; PinFunction::COUNT] = [
        PinFunction::Output,
        PinFunction::Input,
        PinFunction::Alternate,
    ];

    pub fn index(self) -> usize {
        match self {
            PinFunction::Output => 0,
            PinFunction::Input => 1,
            PinFunction::Alternate => 2,
        }
    }
}

impl FromStr for PinFunction {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let v = value.trim().to_ascii_lowercase();
        match v.as_str() {
            "output" | "out" => Ok(PinFunction::Output),
            "input" | "in" => Ok(PinFunction::Input),
            "alternate" | "alt" | "af" => Ok(PinFunction::Alternate),
            _ => Err(format!(
                "unknown pin function '{}'; supported: output, input, alternate",
                value
            )),
        }
    }
}

/// State value held by one cell. Cells come up `Off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinState {
    #[default]
    Off,
    On,
}

impl FromStr for PinState {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let v = value.trim().to_ascii_lowercase();
        match v.as_str() {
            "on" | "1" | "high" => Ok(PinState::On),
            "off" | "0" | "low" => Ok(PinState::Off),
            _ => Err(format!(
                "unknown pin state '{}'; supported: on, off",
                value
            )),
        }
    }
}

/// Release a matrix handle, or report misuse when there is none.
///
/// Passing `None` is a caller error and reports `InvalidArgument`; releasing
/// nothing is not the same as succeeding. A real handle is consumed and its
/// cell storage returned to the store it came from.
pub fn destroy(instance: Option<PinMatrix>) -> MatrixResult<()> {
    match instance {
        None => Err(MatrixError::InvalidArgument(
            "destroy called without a matrix",
        )),
        Some(mut matrix) => matrix.destroy(),
    }
}
