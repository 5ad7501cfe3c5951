use thiserror::Error;

/// Violated input precondition, detected before any protocol round runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionViolation {
    #[error("bit length must be between 1 and 64, got {0}")]
    BitLength(usize),

    #[error("bid {bid} of participant {participant} does not fit in {bit_length} bits")]
    BidOutOfRange {
        participant: usize,
        bid: u64,
        bit_length: usize,
    },

    #[error("value {value} does not fit in {bit_length} bits")]
    ValueOutOfRange { value: u64, bit_length: usize },

    #[error("participant id {id} is out of range for {participant_count} participants")]
    ParticipantId { id: usize, participant_count: usize },

    #[error("participant {participant} carries {actual} bit positions, expected {expected}")]
    BitLengthMismatch {
        participant: usize,
        expected: usize,
        actual: usize,
    },

    #[error("participant at slot {slot} reports id {id}")]
    ParticipantOrder { slot: usize, id: usize },

    #[error("participant {participant} was built for {declared} participants, auction has {actual}")]
    ParticipantCount {
        participant: usize,
        declared: usize,
        actual: usize,
    },

    #[error("public board row {row} has {actual} entries, expected {expected}")]
    BoardShape {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("{0} is not an element of the group")]
    NotGroupElement(&'static str),
}

#[derive(Error, Debug)]
pub enum AuctionError {
    #[error("precondition violated: {0}")]
    Precondition(#[from] PreconditionViolation),

    #[error("bit value must be 0 or 1, got {0}")]
    InvalidBitValue(u8),

    #[error("secure random source failure: {0}")]
    RandomSource(String),

    #[error("modular inverse of {value} does not exist mod {modulus}")]
    ModularInverse { value: String, modulus: String },

    #[error("invalid group parameters: {0}")]
    InvalidParameters(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AuctionError {
    pub fn invalid_parameters(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }
}

pub type Result<T, E = AuctionError> = std::result::Result<T, E>;
