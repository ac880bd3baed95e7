//! Collaborator factory consulted by the initialization phases

use crate::error::SubsystemError;
use crate::hal::{CardSource, DisplaySurface, NetworkTransport, PreferenceStore, TouchSource};

/// Outcome of asking the platform for a collaborator
pub enum Readiness<T> {
    /// Collaborator constructed
    Ready(T),
    /// Not yet; the phase repeats on the next tick
    NotReady,
}

pub type Opened<T: ?Sized> = Result<Readiness<Box<T>>, SubsystemError>;

/// Board-specific construction of every collaborator
///
/// Each method is called once per tick while its phase is current, so an
/// implementation that needs time (a Wi-Fi join, a bus reset) answers
/// [`Readiness::NotReady`] until it is done.
pub trait Platform {
    fn open_preferences(&mut self) -> Opened<dyn PreferenceStore>;

    fn open_display(&mut self) -> Opened<dyn DisplaySurface>;

    fn open_touch(&mut self) -> Opened<dyn TouchSource>;

    fn open_card_reader(&mut self) -> Opened<dyn CardSource>;

    fn open_network(&mut self) -> Opened<dyn NetworkTransport>;
}
