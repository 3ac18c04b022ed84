//! Weekly academic timetabling.
//!
//! Assigns theory lectures and paired laboratory sessions to (day, period)
//! slots for a set of sections, subject to teacher availability, section
//! occupancy, and spacing rules.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Slot`, `Grid`, `Assignment`,
//!   `LabSubject`, `TimetableInput`, `Timetable`
//! - **`availability`**: Per-teacher busy and pre-blocked periods
//! - **`scheduler`**: Lab, theory, and repair phases, the engine that runs
//!   them, and KPIs
//! - **`validation`**: Input checks and post-run invariant audit
//! - **`error`**: Crate error type
//!
//! # Example
//!
//! ```
//! use u_timetable::models::TimetableInput;
//! use u_timetable::scheduler::{EngineConfig, TimetableEngine, TimetableKpi};
//!
//! let input = TimetableInput::new()
//!     .with_year("2", ["A", "B"])
//!     .with_subject("2", "MATHS", 4)
//!     .with_teacher("T1", [("2A", "MATHS"), ("2B", "MATHS")]);
//!
//! let demand = input.total_theory_demand();
//! let engine = TimetableEngine::new(input, EngineConfig::default()).unwrap();
//! let outcome = engine.generate_with_seed(7);
//!
//! let kpi = TimetableKpi::calculate(&outcome.timetable, &outcome.report, demand);
//! assert!((kpi.fill_rate - 1.0).abs() < 1e-10);
//! ```
//!
//! # Determinism
//!
//! Randomness is injected as a `rand::Rng`, and every keyed collection is
//! ordered, so a fixed seed and input reproduce the same timetable.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

pub mod availability;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod validation;
