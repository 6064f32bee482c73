//! Command grammar and command interpreter for Maka.
//!
//! This crate provides:
//! - [`Grammar`] - Command definitions checked against a schema
//! - [`CommandPrototype`] - Default rules shared along a prototype chain
//! - [`CommandInterpreter`] - Turns a command line into an observation
//! - [`InterpreterState`] - Counters, saved values, clock, and theodolite
//! - [`Theodolite`] - The angle-reading device contract
//!
//! Default rules are resolved lazily: a stateful supplier runs only when one
//! of its fields was not given as an argument, and at most once per command.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod clock;
pub mod device;
pub mod grammar;
pub mod interpreter;
pub mod serial;
pub mod state;

pub use clock::{Clock, FixedClock, SystemClock};
pub use device::{
    Angles, DUMMY_THEODOLITE, DeviceSource, DummyTheodolite, LazyTheodolite, SIMULATED_THEODOLITE,
    ScriptedTheodolite, SimulatedTheodolite, Theodolite,
};
pub use grammar::{
    Command, CommandPrototype, CommandSpec, DefaultRule, DefaultValue, Grammar, Supplier,
};
pub use interpreter::{CommandInterpreter, split_compound};
pub use serial::{CounterSpec, SerialNumberGenerator};
pub use state::InterpreterState;
