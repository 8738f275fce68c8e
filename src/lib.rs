//! Versedeck core: verse storage, reference parsing, and the presentation
//! state shared between the operator controller and the live display.
//!
//! The GUI layers sit on top of this crate and talk to exactly two
//! surfaces: the navigation operations on [`presentation::PresentationState`]
//! and the search/translation queries on [`store::VerseStore`].

pub mod config;
pub mod presentation;
pub mod reference;
pub mod store;
