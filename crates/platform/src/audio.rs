//! Serial audio interface types and the framework-facing ports
//!
//! The audio framework drives an amplifier through two ports:
//!
//! - [`CodecDai`]: per-stream setup (rate, wire format, mute)
//! - [`PipelinePower`]: playback pipeline power events
//!
//! Both take `&self`: the framework and the driver's own background work
//! share one device instance, so drivers keep their state behind mutexes.

/// Stream-facing callbacks of a codec DAI (digital audio interface).
pub trait CodecDai {
    /// Error type
    type Error: core::fmt::Debug;

    /// Apply stream parameters (sample rate) before the stream starts.
    async fn hw_params(&self, params: StreamParams) -> Result<(), Self::Error>;

    /// Configure the serial wire format.
    async fn set_fmt(&self, fmt: DaiFormat) -> Result<(), Self::Error>;

    /// Mute (`true`) or unmute (`false`) the stream.
    async fn mute_stream(&self, mute: bool) -> Result<(), Self::Error>;
}

/// Playback pipeline power events.
///
/// `on_activate` is delivered after the pipeline has powered up,
/// `on_deactivate` before it powers down. Events arrive serialised.
pub trait PipelinePower {
    /// Error type
    type Error: core::fmt::Debug;

    /// The pipeline feeding this device has powered up.
    async fn on_activate(&self) -> Result<(), Self::Error>;

    /// The pipeline feeding this device is about to power down.
    ///
    /// Implementations with background work may wait here for it to wind
    /// down; see the implementor's docs for what must be kept running.
    async fn on_deactivate(&self) -> Result<(), Self::Error>;

    /// Returns `true` while the device is in its active power state.
    fn is_active(&self) -> bool;
}

/// Which side drives the bit clock and frame clock.
///
/// Named from the codec's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockRole {
    /// Codec consumes both bit clock and frame clock (codec is slave).
    Consumer,
    /// Codec provides both clocks (codec is master).
    Provider,
    /// Codec provides the bit clock, consumes the frame clock.
    BitProviderFrameConsumer,
    /// Codec consumes the bit clock, provides the frame clock.
    BitConsumerFrameProvider,
}

/// Logical serial data format on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialFormat {
    /// Philips I²S: first data bit one bit clock after the frame edge.
    I2s,
    /// Left-justified: first data bit on the frame edge.
    LeftJustified,
    /// Right-justified: last data bit at the end of the frame half.
    RightJustified,
    /// TDM with a one-bit-clock pulse frame sync, data delayed by one bit.
    DspA,
    /// TDM with a one-bit-clock pulse frame sync, no data delay.
    DspB,
}

/// Clock polarity inversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockInversion {
    /// Normal bit clock, normal frame clock.
    None,
    /// Normal bit clock, inverted frame clock.
    Frame,
    /// Inverted bit clock, normal frame clock.
    Bit,
    /// Both clocks inverted.
    BitAndFrame,
}

/// Complete DAI format descriptor as handed over by the framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DaiFormat {
    /// Clock provider/consumer role of the codec.
    pub role: ClockRole,
    /// Serial data format.
    pub format: SerialFormat,
    /// Clock edge polarity.
    pub inversion: ClockInversion,
}

impl DaiFormat {
    /// Codec-as-consumer descriptor with normal polarity.
    pub const fn consumer(format: SerialFormat) -> Self {
        Self {
            role: ClockRole::Consumer,
            format,
            inversion: ClockInversion::None,
        }
    }
}

/// PCM sample container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleFormat {
    /// Signed 16-bit, little-endian.
    S16Le,
    /// Signed 18-bit in 3 bytes, little-endian.
    S18_3Le,
    /// Signed 20-bit in 3 bytes, little-endian.
    S20_3Le,
    /// Signed 24-bit in 4 bytes, little-endian.
    S24Le,
    /// Signed 32-bit, little-endian.
    S32Le,
}

/// Per-stream parameters delivered to [`CodecDai::hw_params`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamParams {
    /// Sample rate in Hz
    pub rate: u32,
    /// Sample container format
    pub format: SampleFormat,
    /// Number of channels in the frame
    pub channels: u8,
}

impl Default for StreamParams {
    fn default() -> Self {
        Self {
            rate: 48_000,
            format: SampleFormat::S16Le,
            channels: 2,
        }
    }
}

/// What a DAI advertises to the framework for stream negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaiCapabilities {
    /// Stream name the DAI is attached to.
    pub stream_name: &'static str,
    /// Supported sample rates in Hz.
    pub rates: &'static [u32],
    /// Supported sample formats.
    pub formats: &'static [SampleFormat],
    /// Minimum channel count.
    pub channels_min: u8,
    /// Maximum channel count.
    pub channels_max: u8,
}

impl DaiCapabilities {
    /// Returns `true` if the framework may negotiate `params` with this DAI.
    pub fn supports(&self, params: &StreamParams) -> bool {
        self.rates.contains(&params.rate)
            && self.formats.contains(&params.format)
            && (self.channels_min..=self.channels_max).contains(&params.channels)
    }
}
