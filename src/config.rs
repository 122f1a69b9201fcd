//! Configuration knobs for the framing core.

/// Framing configuration.
///
/// The defaults describe a conforming client: outgoing frames are masked,
/// text payloads are validated, messages are delivered whole, and no
/// payload cap is enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Mask outgoing frames (RFC 6455 §5.3 requires this of clients).
    ///
    /// Turning masking off skips the XOR pass and the 4-byte key per
    /// frame. Only safe over TLS, where the masking serves no purpose.
    ///
    /// Default: true
    pub mask_frames: bool,

    /// Skip UTF-8 validation of text messages and close reasons.
    ///
    /// Default: false
    pub skip_utf8_validation: bool,

    /// Deliver every data frame as it arrives instead of reassembling
    /// fragmented messages. Continuation frames surface with their
    /// on-wire opcode, and UTF-8 validation is left to the caller.
    ///
    /// Default: false
    pub fire_cont_frame: bool,

    /// Largest payload the decoder will accept, checked against the
    /// declared length before the payload buffer is allocated.
    ///
    /// Default: `None` (unlimited)
    pub max_payload_bytes: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mask_frames: true,
            skip_utf8_validation: false,
            fire_cont_frame: false,
            max_payload_bytes: None,
        }
    }
}

impl Config {
    /// Create a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether outgoing frames are masked.
    #[must_use]
    pub const fn with_mask_frames(mut self, mask: bool) -> Self {
        self.mask_frames = mask;
        self
    }

    /// Set whether UTF-8 validation is skipped.
    #[must_use]
    pub const fn with_skip_utf8_validation(mut self, skip: bool) -> Self {
        self.skip_utf8_validation = skip;
        self
    }

    /// Set whether data frames are delivered without reassembly.
    #[must_use]
    pub const fn with_fire_cont_frame(mut self, fire: bool) -> Self {
        self.fire_cont_frame = fire;
        self
    }

    /// Cap the payload size the decoder accepts.
    #[must_use]
    pub const fn with_max_payload_bytes(mut self, max: usize) -> Self {
        self.max_payload_bytes = Some(max);
        self
    }
}
