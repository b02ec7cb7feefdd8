use defense_data::model::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    Local,
    Device,
}

/// A defense request: `direction` pressed at `timestamp_ms` of run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub timestamp_ms: u64,
    pub direction: Direction,
    pub source: InputSource,
}

impl InputEvent {
    pub fn local(timestamp_ms: u64, direction: Direction) -> Self {
        Self { timestamp_ms, direction, source: InputSource::Local }
    }

    pub fn device(timestamp_ms: u64, direction: Direction) -> Self {
        Self { timestamp_ms, direction, source: InputSource::Device }
    }
}
