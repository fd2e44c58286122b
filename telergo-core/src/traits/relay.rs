//! Relay actuation trait

/// The two relay outputs of the switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RelayChannel {
    /// Switches the load itself (the AC side).
    Primary,
    /// Auxiliary switching function, energized ahead of the primary when
    /// closing and released after it when opening.
    Auxiliary,
}

/// Write-only actuation of the two relay outputs.
///
/// No feedback signal is read back; the sequencer assumes every write
/// takes effect. Implementations map a channel to whatever drives the
/// coil (GPIO, shift register, port expander).
pub trait RelayActuator {
    /// Energize (`true`) or release (`false`) one relay output.
    fn set_output(&mut self, channel: RelayChannel, energized: bool);
}
