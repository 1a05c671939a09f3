//! MIDI messages as they travel over a live connection, and their command kinds.
//!
//! A [`Message`](enum.Message.html) is what the [`Decoder`](../struct.Decoder.html) hands out
//! once all of the bytes of a message have arrived. Messages can also be parsed directly from a
//! delimited packet through [`Message::parse`](enum.Message.html#method.parse), for transports
//! that already split the stream into messages (USB-MIDI, most OS APIs).

use crate::prelude::*;

/// A complete MIDI message.
///
/// Messages borrow any variable-length data (that is, SysEx payloads) from the buffer they were
/// decoded from, so they must be consumed or copied before the decoder is fed again.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Message<'a> {
    /// A channel voice message, carrying musical data.
    ///
    /// Status byte in the range `0x80 ..= 0xEF`.
    Channel {
        /// The MIDI channel that this message is associated with.
        channel: u4,
        /// The message type and associated data.
        message: ChannelMessage,
    },
    /// A System Common message, including System Exclusive dumps.
    ///
    /// Status byte in the range `0xF0 ..= 0xF7`.
    Common(SystemCommon<'a>),
    /// A one-byte System Realtime message.
    ///
    /// Status byte in the range `0xF8 ..= 0xFF`.
    Realtime(SystemRealtime),
}
impl<'a> Message<'a> {
    /// Parse a complete MIDI message from a delimited packet.
    ///
    /// The packet must start with a status byte, followed by exactly the data bytes its command
    /// requires. Any extra bytes after a fixed-size message are ignored.
    /// System Exclusive packets must hold the leading `0xF0`, the data bytes and the closing
    /// `0xF7`.
    ///
    /// Running status is not supported here, since every packet stands on its own. Use a
    /// [`Decoder`](../struct.Decoder.html) for undelimited byte streams.
    pub fn parse(raw: &'a [u8]) -> Result<Message<'a>> {
        let (&status, data) = raw
            .split_first()
            .ok_or_else(|| err_invalid!("no status byte"))?;
        match status {
            0x00..=0x7F => bail!(err_invalid!("expected a status byte")),
            0xF0 => {
                let sysex = parse_sysex(data)?;
                Ok(Message::Common(SystemCommon::SysEx(sysex)))
            }
            0xF8..=0xFF => {
                let rt = SystemRealtime::from_status(status)
                    .ok_or_else(|| err_invalid!("undefined system realtime status"))?;
                Ok(Message::Realtime(rt))
            }
            _ => {
                let len = data_len(status)
                    .ok_or_else(|| err_invalid!("undefined system common status"))?;
                let data = read_data(data, len)?;
                Message::assemble(status, data)
                    .ok_or_else(|| err_invalid!("unexpected end of exclusive").into())
            }
        }
    }

    /// Build a fixed-size message out of its status byte and data bytes.
    ///
    /// Unused data bytes are ignored. Returns `None` for statuses that do not form a fixed-size
    /// message by themselves (SysEx start and end, undefined statuses).
    pub(crate) fn assemble(status: u8, data: [u7; 2]) -> Option<Message<'static>> {
        let msg = match status {
            0x80..=0xEF => {
                let (channel, message) = ChannelMessage::read(status, data);
                Message::Channel { channel, message }
            }
            0xF1 => Message::Common(SystemCommon::MidiTimeCodeQuarterFrame(
                MtcQuarterFrameMessage::from_code(data[0].as_int() >> 4),
                u4::from(data[0].as_int()),
            )),
            0xF2 => Message::Common(SystemCommon::SongPosition(u14::from_lsb_msb(
                data[0], data[1],
            ))),
            0xF3 => Message::Common(SystemCommon::SongSelect(data[0])),
            0xF5 => Message::Common(SystemCommon::BusSelect(data[0])),
            0xF6 => Message::Common(SystemCommon::TuneRequest),
            _ => Message::Realtime(SystemRealtime::from_status(status)?),
        };
        Some(msg)
    }

    /// The channel of a channel voice message, or `None` for system messages.
    #[inline]
    pub fn channel(&self) -> Option<u4> {
        match self {
            Message::Channel { channel, .. } => Some(*channel),
            _ => None,
        }
    }

    /// The command kind of a channel voice message, or `None` for system messages.
    #[inline]
    pub fn command(&self) -> Option<Command> {
        match self {
            Message::Channel { message, .. } => Some(message.command()),
            _ => None,
        }
    }

    /// The command kind of a system message, or `None` for channel voice messages.
    #[inline]
    pub fn system_command(&self) -> Option<SystemCommand> {
        match self {
            Message::Channel { .. } => None,
            Message::Common(common) => Some(common.command()),
            Message::Realtime(rt) => Some(rt.command()),
        }
    }

    /// Whether this is a single-byte realtime message, which may show up in between the bytes of
    /// any other message.
    #[inline]
    pub fn is_realtime(&self) -> bool {
        matches!(self, Message::Realtime(_))
    }
}

/// Number of data bytes that follow a status byte, or `None` if the message does not have a
/// fixed size.
pub(crate) fn data_len(status: u8) -> Option<usize> {
    match status {
        0x00..=0x7F => None,
        0x80..=0xEF => Command::from_status(status).map(Command::data_len),
        _ => SystemCommand::from_status(status).and_then(SystemCommand::data_len),
    }
}

fn read_data(raw: &[u8], len: usize) -> StdResult<[u7; 2], &'static ErrorKind> {
    ensure!(raw.len() >= len, err_truncated!("missing data bytes"));
    let mut data = [u7::new(0); 2];
    for (slot, &byte) in data.iter_mut().zip(&raw[..len]) {
        *slot = u7::check_int(byte)?;
    }
    Ok(data)
}

fn parse_sysex(raw: &[u8]) -> StdResult<&[u7], &'static ErrorKind> {
    match raw.split_last() {
        Some((&0xF7, data)) => {
            u7::slice_try_from_int(data).ok_or_else(|| err_invalid!("status byte inside sysex"))
        }
        _ => bail!(err_truncated!("sysex without end of exclusive")),
    }
}

/// The kind of a channel voice message, identified by the top nibble of its status byte.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Command {
    /// `0x8`, 2 data bytes.
    NoteOff,
    /// `0x9`, 2 data bytes.
    NoteOn,
    /// Polyphonic key pressure. `0xA`, 2 data bytes.
    Aftertouch,
    /// Continuous controller. `0xB`, 2 data bytes.
    Controller,
    /// Patch change. `0xC`, 1 data byte.
    ProgramChange,
    /// `0xD`, 1 data byte.
    ChannelPressure,
    /// `0xE`, 2 data bytes.
    PitchBend,
}
impl Command {
    /// Classify a channel voice status byte (`0x80 ..= 0xEF`).
    ///
    /// The channel nibble is ignored.
    pub fn from_status(status: u8) -> Option<Command> {
        Some(match status >> 4 {
            0x8 => Command::NoteOff,
            0x9 => Command::NoteOn,
            0xA => Command::Aftertouch,
            0xB => Command::Controller,
            0xC => Command::ProgramChange,
            0xD => Command::ChannelPressure,
            0xE => Command::PitchBend,
            _ => return None,
        })
    }

    /// The top nibble of the status byte for this command.
    pub fn status_nibble(self) -> u8 {
        match self {
            Command::NoteOff => 0x8,
            Command::NoteOn => 0x9,
            Command::Aftertouch => 0xA,
            Command::Controller => 0xB,
            Command::ProgramChange => 0xC,
            Command::ChannelPressure => 0xD,
            Command::PitchBend => 0xE,
        }
    }

    /// How many data bytes follow the status byte.
    pub fn data_len(self) -> usize {
        match self {
            Command::ProgramChange | Command::ChannelPressure => 1,
            _ => 2,
        }
    }
}

/// The kind of a system message, identified by its whole status byte.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum SystemCommand {
    /// Start of a SysEx dump. `0xF0`, data bytes until `EndExclusive`.
    Exclusive,
    /// `0xF1`, 1 data byte.
    TimeCodeQuarterFrame,
    /// `0xF2`, 2 data bytes.
    SongPosition,
    /// `0xF3`, 1 data byte.
    SongSelect,
    /// `0xF5`, 1 data byte.
    BusSelect,
    /// `0xF6`, no data.
    TuneRequest,
    /// Closes a SysEx dump. `0xF7`, no data.
    EndExclusive,
    /// `0xF8`, realtime.
    TimingClock,
    /// `0xFA`, realtime.
    Start,
    /// `0xFB`, realtime.
    Continue,
    /// `0xFC`, realtime.
    Stop,
    /// `0xFE`, realtime.
    ActiveSensing,
    /// `0xFF`, realtime.
    Reset,
}
impl SystemCommand {
    /// Classify a system status byte (`0xF0 ..= 0xFF`).
    ///
    /// Returns `None` for the undefined statuses `0xF4`, `0xF9` and `0xFD`.
    pub fn from_status(status: u8) -> Option<SystemCommand> {
        use SystemCommand::*;
        Some(match status {
            0xF0 => Exclusive,
            0xF1 => TimeCodeQuarterFrame,
            0xF2 => SongPosition,
            0xF3 => SongSelect,
            0xF5 => BusSelect,
            0xF6 => TuneRequest,
            0xF7 => EndExclusive,
            0xF8 => TimingClock,
            0xFA => Start,
            0xFB => Continue,
            0xFC => Stop,
            0xFE => ActiveSensing,
            0xFF => Reset,
            _ => return None,
        })
    }

    /// The status byte for this command.
    pub fn status(self) -> u8 {
        use SystemCommand::*;
        match self {
            Exclusive => 0xF0,
            TimeCodeQuarterFrame => 0xF1,
            SongPosition => 0xF2,
            SongSelect => 0xF3,
            BusSelect => 0xF5,
            TuneRequest => 0xF6,
            EndExclusive => 0xF7,
            TimingClock => 0xF8,
            Start => 0xFA,
            Continue => 0xFB,
            Stop => 0xFC,
            ActiveSensing => 0xFE,
            Reset => 0xFF,
        }
    }

    /// How many data bytes follow the status byte.
    ///
    /// `None` for `Exclusive`, which takes any amount of data bytes until `EndExclusive`.
    pub fn data_len(self) -> Option<usize> {
        use SystemCommand::*;
        match self {
            Exclusive => None,
            SongPosition => Some(2),
            TimeCodeQuarterFrame | SongSelect | BusSelect => Some(1),
            _ => Some(0),
        }
    }

    /// Whether this is a realtime command, allowed to interleave with any other message.
    pub fn is_realtime(self) -> bool {
        self.status() >= 0xF8
    }
}

/// A channel voice message.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum ChannelMessage {
    /// Stop playing a note.
    NoteOff {
        /// The MIDI key to stop playing.
        key: u7,
        /// The velocity with which to stop playing it.
        vel: u7,
    },
    /// Start playing a note.
    NoteOn {
        /// The key to start playing.
        key: u7,
        /// The velocity (strength) with which to press it.
        ///
        /// Note that by convention a `NoteOn` message with a velocity of 0 is equivalent to a
        /// `NoteOff`.
        vel: u7,
    },
    /// Modify the velocity of a note after it has been played.
    Aftertouch {
        /// The key for which to modify its velocity.
        key: u7,
        /// The new velocity for the key.
        vel: u7,
    },
    /// Modify the value of a MIDI controller.
    Controller {
        /// The controller to modify.
        controller: u7,
        /// The value to set it to.
        value: u7,
    },
    /// Change the program (also known as instrument) for a channel.
    ProgramChange {
        /// The new program (instrument) to use for the channel.
        program: u7,
    },
    /// Change the note velocity of a whole channel at once, without starting new notes.
    ChannelAftertouch {
        /// The new velocity for all notes currently playing in the channel.
        vel: u7,
    },
    /// Set the pitch bend value for the entire channel.
    PitchBend {
        /// The new pitch-bend value.
        bend: PitchBend,
    },
}
impl ChannelMessage {
    /// Receives status byte and data bytes separately.
    ///
    /// Unused data bytes are ignored.
    /// Panics if `status` is not a channel voice status (`0x80 ..= 0xEF`).
    pub(crate) fn read(status: u8, data: [u7; 2]) -> (u4, ChannelMessage) {
        let channel = u4::from(status);
        let msg = match status >> 4 {
            0x8 => ChannelMessage::NoteOff {
                key: data[0],
                vel: data[1],
            },
            0x9 => ChannelMessage::NoteOn {
                key: data[0],
                vel: data[1],
            },
            0xA => ChannelMessage::Aftertouch {
                key: data[0],
                vel: data[1],
            },
            0xB => ChannelMessage::Controller {
                controller: data[0],
                value: data[1],
            },
            0xC => ChannelMessage::ProgramChange { program: data[0] },
            0xD => ChannelMessage::ChannelAftertouch { vel: data[0] },
            0xE => ChannelMessage::PitchBend {
                bend: PitchBend(u14::from_lsb_msb(data[0], data[1])),
            },
            _ => panic!("read channel message before checking that status is in range"),
        };
        (channel, msg)
    }

    /// The command kind of this message.
    pub fn command(&self) -> Command {
        match self {
            ChannelMessage::NoteOff { .. } => Command::NoteOff,
            ChannelMessage::NoteOn { .. } => Command::NoteOn,
            ChannelMessage::Aftertouch { .. } => Command::Aftertouch,
            ChannelMessage::Controller { .. } => Command::Controller,
            ChannelMessage::ProgramChange { .. } => Command::ProgramChange,
            ChannelMessage::ChannelAftertouch { .. } => Command::ChannelPressure,
            ChannelMessage::PitchBend { .. } => Command::PitchBend,
        }
    }
}

/// The value of a pitch bend, represented as 14 bits.
///
/// A value of `0x0000` indicates full bend downwards.
/// A value of `0x2000` indicates no bend.
/// A value of `0x3FFF` indicates full bend upwards.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct PitchBend(pub u14);
impl PitchBend {
    /// The middle value of `0x2000`, indicating no bend.
    #[inline]
    pub const fn mid_raw_value() -> PitchBend {
        PitchBend(u14::new(0x2000))
    }

    /// Returns an int in the range `[-0x2000, 0x1FFF]`.
    #[inline]
    pub fn as_int(self) -> i16 {
        self.0.as_int() as i16 - 0x2000
    }

    /// Returns an `f32` in the range `[-1.0, 1.0)`.
    #[inline]
    pub fn as_f32(self) -> f32 {
        self.as_int() as f32 * (1.0 / 0x2000 as f32)
    }
}

/// A System Common message.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum SystemCommon<'a> {
    /// A system-exclusive dump. The data does not include the leading `F0` or the closing `F7`,
    /// only data bytes are allowed.
    SysEx(&'a [u7]),
    /// A single nibble of a MIDI Time Code position.
    MidiTimeCodeQuarterFrame(MtcQuarterFrameMessage, u4),
    /// The number of MIDI beats (6 x MIDI clocks) that have elapsed since the start of the
    /// sequence.
    SongPosition(u14),
    /// Select a given song index.
    SongSelect(u7),
    /// Route the following messages to the given bus.
    BusSelect(u7),
    /// Request analog synthesizers to tune their oscillators.
    TuneRequest,
}
impl SystemCommon<'_> {
    /// The command kind of this message.
    pub fn command(&self) -> SystemCommand {
        match self {
            SystemCommon::SysEx(_) => SystemCommand::Exclusive,
            SystemCommon::MidiTimeCodeQuarterFrame(..) => SystemCommand::TimeCodeQuarterFrame,
            SystemCommon::SongPosition(_) => SystemCommand::SongPosition,
            SystemCommon::SongSelect(_) => SystemCommand::SongSelect,
            SystemCommon::BusSelect(_) => SystemCommand::BusSelect,
            SystemCommon::TuneRequest => SystemCommand::TuneRequest,
        }
    }
}

/// Which part of the MIDI Time Code a quarter frame message carries.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum MtcQuarterFrameMessage {
    FramesLow,
    FramesHigh,
    SecondsLow,
    SecondsHigh,
    MinutesLow,
    MinutesHigh,
    HoursLow,
    HoursHigh,
}
impl MtcQuarterFrameMessage {
    /// Only the bottom 3 bits of `code` are used.
    fn from_code(code: u8) -> MtcQuarterFrameMessage {
        use MtcQuarterFrameMessage::*;
        match code & 0x7 {
            0 => FramesLow,
            1 => FramesHigh,
            2 => SecondsLow,
            3 => SecondsHigh,
            4 => MinutesLow,
            5 => MinutesHigh,
            6 => HoursLow,
            _ => HoursHigh,
        }
    }
}

/// Messages that only occur in live MIDI connections, and can occur at ANY time, even during
/// transmission of other message data bytes.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum SystemRealtime {
    /// If sent, they should be sent 24 times per quarter note.
    TimingClock,
    Start,
    Continue,
    Stop,
    /// Once one of these messages is transmitted, a message should arrive every 300ms or else the
    /// connection is considered broken.
    ActiveSensing,
    Reset,
}
impl SystemRealtime {
    /// Returns `None` for anything other than a defined realtime status byte.
    pub fn from_status(status: u8) -> Option<SystemRealtime> {
        use SystemRealtime::*;
        Some(match status {
            0xF8 => TimingClock,
            0xFA => Start,
            0xFB => Continue,
            0xFC => Stop,
            0xFE => ActiveSensing,
            0xFF => Reset,
            _ => return None,
        })
    }

    pub fn command(self) -> SystemCommand {
        use SystemRealtime::*;
        match self {
            TimingClock => SystemCommand::TimingClock,
            Start => SystemCommand::Start,
            Continue => SystemCommand::Continue,
            Stop => SystemCommand::Stop,
            ActiveSensing => SystemCommand::ActiveSensing,
            Reset => SystemCommand::Reset,
        }
    }
}
