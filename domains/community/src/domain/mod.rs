//! Community domain layer: entities, state machines, validation rules

pub mod entities;
pub mod state;
pub mod validation;
