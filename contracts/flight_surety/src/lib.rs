#![no_std]

//! Flight delay insurance with multiparty airline governance and a
//! quorum-of-oracles flight status protocol.
//!
//! Airlines join by registration (direct while few, by vote of a strict
//! majority of participated airlines after that) and pay a fixed ante to
//! participate. Participated airlines register flights, passengers buy
//! capped delay insurance against them, and a pool of fee-paying oracles
//! settles a flight's status once enough of them agree. A late-airline
//! settlement credits every insuree at 1.5x, claimable through
//! `withdraw_insurance`.

mod storage;
pub mod types;

use soroban_sdk::{
    contract, contractimpl, token, xdr::ToXdr, Address, Bytes, BytesN, Env, Map, String, Symbol,
    Vec,
};

use crate::types::{
    Airline, Config, Error, Flight, InsuranceProfile, InsuranceRecord, Oracle, OracleRequest,
};

//
// ──────────────────────────────────────────────────────────
// CONSTANTS
// ──────────────────────────────────────────────────────────
//

/// Amounts are in 7-decimal token units, so 10_000_000 is one whole unit.
pub const UNIT: i128 = 10_000_000;

/// Stake an airline must pay to become participated.
pub const AIRLINE_ANTE: i128 = 10 * UNIT;

/// Maximum insurance purchase per passenger per flight.
pub const INSURANCE_CAP: i128 = UNIT;

/// Fee an oracle pays on registration.
pub const ORACLE_REGISTRATION_FEE: i128 = UNIT;

/// Registered airlines below this count are admitted without a vote.
pub const MULTIPARTY_THRESHOLD: u32 = 4;

/// Matching responses required to settle a flight's status.
pub const MIN_RESPONSES: u32 = 3;

/// Oracle indexes and request indexes are drawn from 0..MAX_INDEX.
pub const MAX_INDEX: u32 = 10;

pub const STATUS_CODE_UNKNOWN: u32 = 0;
pub const STATUS_CODE_ON_TIME: u32 = 10;
pub const STATUS_CODE_LATE_AIRLINE: u32 = 20;
pub const STATUS_CODE_LATE_WEATHER: u32 = 30;
pub const STATUS_CODE_LATE_TECHNICAL: u32 = 40;
pub const STATUS_CODE_LATE_OTHER: u32 = 50;

//
// ──────────────────────────────────────────────────────────
// CONTRACT
// ──────────────────────────────────────────────────────────
//

#[contract]
pub struct FlightSuretyContract;

#[contractimpl]
impl FlightSuretyContract {
    // ───────────── INITIALIZATION ─────────────

    /// Initialize the contract with its owner, the payment token used for
    /// antes, premiums, fees and payouts, and the genesis airline, which is
    /// registered and participated without paying the ante.
    pub fn initialize(
        env: Env,
        owner: Address,
        payment_token: Address,
        first_airline: Address,
    ) -> Result<(), Error> {
        owner.require_auth();

        if storage::has_config(&env) {
            return Err(Error::AlreadyInitialized);
        }

        let config = Config {
            owner,
            payment_token,
            operational: true,
        };
        storage::set_config(&env, &config);

        storage::set_airline(
            &env,
            &first_airline,
            &Airline {
                registered: true,
                participated: true,
            },
        );
        storage::set_registered_airline_count(&env, 1);
        storage::set_participated_airline_count(&env, 1);

        Ok(())
    }

    // ───────────── ACCESS & MODE CONTROL ─────────────

    /// Toggle the global operational switch. Owner only.
    pub fn set_operating_status(env: Env, caller: Address, mode: bool) -> Result<(), Error> {
        caller.require_auth();

        let mut config = storage::get_config(&env)?;
        if caller != config.owner {
            return Err(Error::Unauthorized);
        }

        config.operational = mode;
        storage::set_config(&env, &config);
        Ok(())
    }

    pub fn is_operational(env: Env) -> Result<bool, Error> {
        Ok(storage::get_config(&env)?.operational)
    }

    // ───────────── AIRLINE GOVERNANCE ─────────────

    /// Register a candidate airline. While fewer than `MULTIPARTY_THRESHOLD`
    /// airlines are registered the candidate is admitted directly; after that
    /// it is placed in the voting queue to await quorum.
    pub fn register_airline(env: Env, caller: Address, candidate: Address) -> Result<(), Error> {
        caller.require_auth();
        Self::require_operational(&env)?;

        if !storage::get_airline(&env, &caller).participated {
            return Err(Error::NotParticipatedAirline);
        }
        if storage::get_airline(&env, &candidate).registered {
            return Err(Error::AirlineAlreadyRegistered);
        }

        let registered_count = storage::get_registered_airline_count(&env);
        if registered_count < MULTIPARTY_THRESHOLD {
            storage::set_airline(
                &env,
                &candidate,
                &Airline {
                    registered: true,
                    participated: false,
                },
            );
            let new_count = registered_count + 1;
            storage::set_registered_airline_count(&env, new_count);

            env.events().publish(
                (Symbol::new(&env, "airline"), Symbol::new(&env, "registered")),
                (candidate, true, new_count),
            );
        } else {
            let mut queue = storage::get_voting_queue(&env);
            if !queue.contains(&candidate) {
                queue.push_back(candidate.clone());
                storage::set_voting_queue(&env, &queue);

                env.events().publish(
                    (Symbol::new(&env, "airline"), Symbol::new(&env, "queued")),
                    (candidate, queue.len()),
                );
            }
        }

        Ok(())
    }

    /// Cast a vote for a queued candidate. The candidate is promoted once its
    /// votes exceed half of the currently participated airlines.
    pub fn vote_airline(env: Env, caller: Address, candidate: Address) -> Result<(), Error> {
        caller.require_auth();
        Self::require_operational(&env)?;

        if !storage::get_airline(&env, &caller).registered {
            return Err(Error::NotRegisteredAirline);
        }

        let mut queue = storage::get_voting_queue(&env);
        if !queue.contains(&candidate) {
            return Err(Error::NotInVotingQueue);
        }

        let mut votes = storage::get_votes(&env, &candidate);
        if votes.contains(&caller) {
            return Err(Error::AlreadyVoted);
        }
        votes.push_back(caller);
        let vote_count = votes.len();

        // Strict majority of participated airlines, not registered ones.
        let participated_count = storage::get_participated_airline_count(&env);
        if vote_count > participated_count / 2 {
            if let Some(position) = queue.first_index_of(&candidate) {
                queue.remove(position);
            }
            storage::set_voting_queue(&env, &queue);
            storage::remove_votes(&env, &candidate);

            storage::set_airline(
                &env,
                &candidate,
                &Airline {
                    registered: true,
                    participated: false,
                },
            );
            let new_count = storage::get_registered_airline_count(&env) + 1;
            storage::set_registered_airline_count(&env, new_count);

            env.events().publish(
                (
                    Symbol::new(&env, "airline"),
                    Symbol::new(&env, "voted_registered"),
                ),
                (candidate, vote_count, new_count, queue.len()),
            );
        } else {
            storage::set_votes(&env, &candidate, &votes);

            env.events().publish(
                (Symbol::new(&env, "airline"), Symbol::new(&env, "voted")),
                (candidate, vote_count, queue.len()),
            );
        }

        Ok(())
    }

    /// Pay the ante to become a participated airline. The full amount is
    /// retained, including any overpayment above the ante.
    pub fn fund_airline(env: Env, airline: Address, amount: i128) -> Result<(), Error> {
        airline.require_auth();
        Self::require_operational(&env)?;

        let state = storage::get_airline(&env, &airline);
        if !state.registered {
            return Err(Error::NotRegisteredAirline);
        }
        if state.participated {
            return Err(Error::AlreadyParticipated);
        }
        if amount < AIRLINE_ANTE {
            return Err(Error::InsufficientFunds);
        }

        let config = storage::get_config(&env)?;
        let token_client = token::Client::new(&env, &config.payment_token);
        token_client.transfer(&airline, &env.current_contract_address(), &amount);

        storage::set_airline(
            &env,
            &airline,
            &Airline {
                registered: true,
                participated: true,
            },
        );
        let new_count = storage::get_participated_airline_count(&env) + 1;
        storage::set_participated_airline_count(&env, new_count);

        env.events().publish(
            (
                Symbol::new(&env, "airline"),
                Symbol::new(&env, "participated"),
            ),
            (airline, amount, new_count),
        );

        Ok(())
    }

    pub fn get_airline_info(env: Env, airline: Address) -> (bool, bool) {
        let state = storage::get_airline(&env, &airline);
        (state.registered, state.participated)
    }

    /// (registered, participated) airline counts.
    pub fn get_airline_counts(env: Env) -> (u32, u32) {
        (
            storage::get_registered_airline_count(&env),
            storage::get_participated_airline_count(&env),
        )
    }

    // ───────────── FLIGHT REGISTRY ─────────────

    /// Register a flight, keyed by (airline, name, departure timestamp).
    pub fn register_flight(
        env: Env,
        airline: Address,
        flight_name: String,
        departure_timestamp: u64,
    ) -> Result<(), Error> {
        airline.require_auth();
        Self::require_operational(&env)?;

        if !storage::get_airline(&env, &airline).participated {
            return Err(Error::NotParticipatedAirline);
        }

        let flight_key = Self::flight_key(&env, &airline, &flight_name, departure_timestamp);
        if storage::get_flight(&env, &flight_key).is_some() {
            return Err(Error::FlightAlreadyRegistered);
        }

        storage::set_flight(
            &env,
            &flight_key,
            &Flight {
                airline: airline.clone(),
                flight_name: flight_name.clone(),
                departure_timestamp,
                status_code: STATUS_CODE_UNKNOWN,
                registered: true,
            },
        );

        env.events().publish(
            (Symbol::new(&env, "flight"), Symbol::new(&env, "registered")),
            (airline, flight_name, departure_timestamp, STATUS_CODE_UNKNOWN),
        );

        Ok(())
    }

    pub fn get_flight_status(
        env: Env,
        airline: Address,
        flight_name: String,
        departure_timestamp: u64,
    ) -> Result<u32, Error> {
        let flight_key = Self::flight_key(&env, &airline, &flight_name, departure_timestamp);
        let flight = storage::get_flight(&env, &flight_key).ok_or(Error::FlightNotFound)?;
        Ok(flight.status_code)
    }

    // ───────────── INSURANCE LEDGER ─────────────

    /// Buy delay insurance on a registered flight, up to `INSURANCE_CAP`.
    /// One record per passenger per flight; the 1.5x credit balance is fixed
    /// at purchase time and only becomes claimable after a late-airline
    /// settlement.
    pub fn buy_insurance(
        env: Env,
        passenger: Address,
        airline: Address,
        flight_name: String,
        departure_timestamp: u64,
        amount: i128,
    ) -> Result<(), Error> {
        passenger.require_auth();
        Self::require_operational(&env)?;

        let flight_key = Self::flight_key(&env, &airline, &flight_name, departure_timestamp);
        if storage::get_flight(&env, &flight_key).is_none() {
            return Err(Error::FlightNotFound);
        }
        if amount <= 0 {
            return Err(Error::InsufficientFunds);
        }
        if amount > INSURANCE_CAP {
            return Err(Error::InsuranceCapExceeded);
        }
        if storage::get_insurance(&env, &passenger, &flight_key).is_some() {
            return Err(Error::AlreadyInsured);
        }

        let config = storage::get_config(&env)?;
        let token_client = token::Client::new(&env, &config.payment_token);
        token_client.transfer(&passenger, &env.current_contract_address(), &amount);

        let credit_balance = amount * 3 / 2;
        storage::set_insurance(
            &env,
            &passenger,
            &flight_key,
            &InsuranceRecord {
                bought_balance: amount,
                credit_balance,
                credited: false,
                withdrawn: false,
            },
        );
        storage::add_flight_insuree(&env, &flight_key, &passenger);

        env.events().publish(
            (Symbol::new(&env, "insurance"), Symbol::new(&env, "bought")),
            (
                passenger,
                amount,
                credit_balance,
                airline,
                flight_name,
                departure_timestamp,
            ),
        );

        Ok(())
    }

    /// Withdraw the credit balance of a settled insurance record. The
    /// withdrawn flag is committed before the transfer so a re-entrant call
    /// cannot pay out twice.
    pub fn withdraw_insurance(
        env: Env,
        passenger: Address,
        airline: Address,
        flight_name: String,
        departure_timestamp: u64,
    ) -> Result<(), Error> {
        passenger.require_auth();
        Self::require_operational(&env)?;

        let flight_key = Self::flight_key(&env, &airline, &flight_name, departure_timestamp);
        let mut record =
            storage::get_insurance(&env, &passenger, &flight_key).ok_or(Error::NotCredited)?;
        if !record.credited {
            return Err(Error::NotCredited);
        }
        if record.withdrawn {
            return Err(Error::AlreadyWithdrawn);
        }

        record.withdrawn = true;
        storage::set_insurance(&env, &passenger, &flight_key, &record);

        let config = storage::get_config(&env)?;
        let token_client = token::Client::new(&env, &config.payment_token);
        token_client.transfer(
            &env.current_contract_address(),
            &passenger,
            &record.credit_balance,
        );

        env.events().publish(
            (Symbol::new(&env, "insurance"), Symbol::new(&env, "withdrawn")),
            (true, record.bought_balance, record.credit_balance),
        );

        Ok(())
    }

    pub fn get_insurance_profile(
        env: Env,
        passenger: Address,
        airline: Address,
        flight_name: String,
        departure_timestamp: u64,
    ) -> InsuranceProfile {
        let flight_key = Self::flight_key(&env, &airline, &flight_name, departure_timestamp);
        match storage::get_insurance(&env, &passenger, &flight_key) {
            Some(record) => InsuranceProfile {
                bought: true,
                credited: record.credited,
                withdrawed: record.withdrawn,
                balance: record.bought_balance,
                credit_balance: record.credit_balance,
            },
            None => InsuranceProfile {
                bought: false,
                credited: false,
                withdrawed: false,
                balance: 0,
                credit_balance: 0,
            },
        }
    }

    // ───────────── ORACLE CONSENSUS ─────────────

    /// Register as an oracle by paying the fee. Three distinct indexes in
    /// 0..=9 are drawn at registration and never change.
    pub fn register_oracle(env: Env, caller: Address, amount: i128) -> Result<(), Error> {
        caller.require_auth();
        Self::require_operational(&env)?;

        if amount < ORACLE_REGISTRATION_FEE {
            return Err(Error::InsufficientFunds);
        }
        if storage::get_oracle(&env, &caller).is_some() {
            return Err(Error::OracleAlreadyRegistered);
        }

        let config = storage::get_config(&env)?;
        let token_client = token::Client::new(&env, &config.payment_token);
        token_client.transfer(&caller, &env.current_contract_address(), &amount);

        let indexes = Self::generate_indexes(&env, &caller);
        storage::set_oracle(&env, &caller, &Oracle { indexes });

        Ok(())
    }

    pub fn get_my_indexes(env: Env, caller: Address) -> Result<Vec<u32>, Error> {
        let oracle = storage::get_oracle(&env, &caller).ok_or(Error::OracleNotRegistered)?;
        Ok(oracle.indexes)
    }

    /// Open a status request for a flight. Draws a request index and emits
    /// the event oracle processes watch for; only oracles holding the drawn
    /// index may respond. The flight does not have to be registered.
    pub fn fetch_flight_status(
        env: Env,
        caller: Address,
        airline: Address,
        flight_name: String,
        departure_timestamp: u64,
    ) -> Result<u32, Error> {
        caller.require_auth();
        Self::require_operational(&env)?;

        let index = Self::draw_index(&env, &caller);
        let flight_key = Self::flight_key(&env, &airline, &flight_name, departure_timestamp);

        if storage::get_request(&env, index, &flight_key).is_none() {
            storage::set_request(
                &env,
                index,
                &flight_key,
                &OracleRequest {
                    open: true,
                    responders: Vec::new(&env),
                    responses: Map::new(&env),
                },
            );
        }

        env.events().publish(
            (Symbol::new(&env, "oracle"), Symbol::new(&env, "request")),
            (index, airline, flight_name, departure_timestamp),
        );

        Ok(index)
    }

    /// Submit a status response for an open request. The caller must hold
    /// the requested index; mismatches are filtered out, not logged loudly.
    /// The third matching response settles the flight; late-airline
    /// settlements credit every insuree. Responses after settlement land in
    /// the log without further effect.
    pub fn submit_oracle_response(
        env: Env,
        caller: Address,
        index: u32,
        airline: Address,
        flight_name: String,
        departure_timestamp: u64,
        status_code: u32,
    ) -> Result<(), Error> {
        caller.require_auth();
        Self::require_operational(&env)?;

        let oracle = storage::get_oracle(&env, &caller).ok_or(Error::OracleNotRegistered)?;
        if !oracle.indexes.contains(&index) {
            return Err(Error::IndexMismatch);
        }

        let flight_key = Self::flight_key(&env, &airline, &flight_name, departure_timestamp);
        let mut request =
            storage::get_request(&env, index, &flight_key).ok_or(Error::IndexMismatch)?;

        if request.responders.contains(&caller) {
            return Err(Error::DuplicateOracleResponse);
        }
        request.responders.push_back(caller.clone());

        let mut same_status = request.responses.get(status_code).unwrap_or(Vec::new(&env));
        same_status.push_back(caller);
        request.responses.set(status_code, same_status.clone());

        env.events().publish(
            (Symbol::new(&env, "oracle"), Symbol::new(&env, "report")),
            (
                airline.clone(),
                flight_name.clone(),
                departure_timestamp,
                status_code,
            ),
        );

        let settle = request.open && same_status.len() >= MIN_RESPONSES;
        if settle {
            request.open = false;
        }
        storage::set_request(&env, index, &flight_key, &request);

        if settle {
            Self::settle_flight(
                &env,
                &flight_key,
                &airline,
                &flight_name,
                departure_timestamp,
                status_code,
            );
        }

        Ok(())
    }

    // ───────────── INTERNAL HELPERS ─────────────

    fn require_operational(env: &Env) -> Result<(), Error> {
        if !storage::get_config(env)?.operational {
            return Err(Error::ContractPaused);
        }
        Ok(())
    }

    fn flight_key(
        env: &Env,
        airline: &Address,
        flight_name: &String,
        departure_timestamp: u64,
    ) -> BytesN<32> {
        let payload = (airline.clone(), flight_name.clone(), departure_timestamp).to_xdr(env);
        env.crypto().keccak256(&payload).into()
    }

    /// Entropy for index derivation: chained hashing over the caller, a
    /// monotonic nonce and ledger state. Deterministic under the test env,
    /// opaque on a live ledger.
    fn next_entropy(env: &Env, caller: &Address) -> BytesN<32> {
        let nonce = storage::next_index_nonce(env);
        let payload = (
            caller.clone(),
            nonce,
            env.ledger().sequence(),
            env.ledger().timestamp(),
        )
            .to_xdr(env);
        env.crypto().keccak256(&payload).into()
    }

    fn draw_index(env: &Env, caller: &Address) -> u32 {
        let entropy = Self::next_entropy(env, caller);
        (entropy.to_array()[0] as u32) % MAX_INDEX
    }

    fn generate_indexes(env: &Env, caller: &Address) -> Vec<u32> {
        let mut indexes: Vec<u32> = Vec::new(env);
        let mut entropy = Self::next_entropy(env, caller);
        loop {
            for byte in entropy.to_array() {
                let index = (byte as u32) % MAX_INDEX;
                if !indexes.contains(&index) {
                    indexes.push_back(index);
                    if indexes.len() == 3 {
                        return indexes;
                    }
                }
            }
            // 32 bytes nearly always carry three distinct digits; rehash for
            // the degenerate case.
            let bytes = Bytes::from_array(env, &entropy.to_array());
            entropy = env.crypto().keccak256(&bytes).into();
        }
    }

    fn settle_flight(
        env: &Env,
        flight_key: &BytesN<32>,
        airline: &Address,
        flight_name: &String,
        departure_timestamp: u64,
        status_code: u32,
    ) {
        if let Some(mut flight) = storage::get_flight(env, flight_key) {
            flight.status_code = status_code;
            storage::set_flight(env, flight_key, &flight);
        }

        env.events().publish(
            (Symbol::new(env, "flight"), Symbol::new(env, "status")),
            (
                airline.clone(),
                flight_name.clone(),
                departure_timestamp,
                status_code,
            ),
        );

        if status_code == STATUS_CODE_LATE_AIRLINE {
            Self::credit_insurees(env, flight_key, airline, flight_name, departure_timestamp);
        }
    }

    fn credit_insurees(
        env: &Env,
        flight_key: &BytesN<32>,
        airline: &Address,
        flight_name: &String,
        departure_timestamp: u64,
    ) {
        let insurees = storage::get_flight_insurees(env, flight_key);
        for passenger in insurees.iter() {
            if let Some(mut record) = storage::get_insurance(env, &passenger, flight_key) {
                if !record.credited {
                    record.credited = true;
                    storage::set_insurance(env, &passenger, flight_key, &record);
                }
            }
        }

        env.events().publish(
            (Symbol::new(env, "insurance"), Symbol::new(env, "credited")),
            (
                airline.clone(),
                flight_name.clone(),
                departure_timestamp,
                STATUS_CODE_LATE_AIRLINE,
            ),
        );
    }
}
