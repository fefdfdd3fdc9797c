use soroban_sdk::{contracterror, contracttype, Address, BytesN, Map, String, Vec};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    ContractPaused = 4,
    NotRegisteredAirline = 5,
    NotParticipatedAirline = 6,
    AirlineAlreadyRegistered = 7,
    AlreadyVoted = 8,
    NotInVotingQueue = 9,
    AlreadyParticipated = 10,
    InsufficientFunds = 11,
    FlightAlreadyRegistered = 12,
    FlightNotFound = 13,
    InsuranceCapExceeded = 14,
    AlreadyInsured = 15,
    NotCredited = 16,
    AlreadyWithdrawn = 17,
    OracleAlreadyRegistered = 18,
    OracleNotRegistered = 19,
    IndexMismatch = 20,
    DuplicateOracleResponse = 21,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub owner: Address,
    pub payment_token: Address,
    pub operational: bool,
}

/// Per-airline governance state. `participated` implies `registered`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Airline {
    pub registered: bool,
    pub participated: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Flight {
    pub airline: Address,
    pub flight_name: String,
    pub departure_timestamp: u64,
    pub status_code: u32,
    pub registered: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InsuranceRecord {
    pub bought_balance: i128,
    pub credit_balance: i128,
    pub credited: bool,
    pub withdrawn: bool,
}

/// Passenger-facing view of an insurance record. An absent record reads as
/// all false / zero.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InsuranceProfile {
    pub bought: bool,
    pub credited: bool,
    pub withdrawed: bool,
    pub balance: i128,
    pub credit_balance: i128,
}

/// A registered oracle holds three distinct indexes in 0..=9, fixed at
/// registration time.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Oracle {
    pub indexes: Vec<u32>,
}

/// An open or settled response bucket for one (index, flight) request.
/// `responders` is the full submission log; `responses` groups responders by
/// the status code they reported.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OracleRequest {
    pub open: bool,
    pub responders: Vec<Address>,
    pub responses: Map<u32, Vec<Address>>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Config,
    RegisteredAirlineCount,
    ParticipatedAirlineCount,
    IndexNonce,
    Airline(Address),
    /// Candidate addresses awaiting quorum, in arrival order.
    VotingQueue,
    /// Voter addresses recorded for a queued candidate.
    Votes(Address),
    /// Flight keyed by keccak256(airline, name, departure timestamp).
    Flight(BytesN<32>),
    /// Passengers holding insurance on a flight.
    FlightInsurees(BytesN<32>),
    Insurance(Address, BytesN<32>),
    Oracle(Address),
    /// Response bucket keyed by (requested index, flight key).
    Request(u32, BytesN<32>),
}
