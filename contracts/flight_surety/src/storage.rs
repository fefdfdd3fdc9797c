use soroban_sdk::{Address, BytesN, Env, Vec};

use crate::types::{Airline, Config, DataKey, Error, Flight, InsuranceRecord, Oracle, OracleRequest};

pub fn has_config(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

pub fn set_config(env: &Env, config: &Config) {
    env.storage().instance().set(&DataKey::Config, config);
}

pub fn get_config(env: &Env) -> Result<Config, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(Error::NotInitialized)
}

pub fn get_registered_airline_count(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::RegisteredAirlineCount)
        .unwrap_or(0)
}

pub fn set_registered_airline_count(env: &Env, count: u32) {
    env.storage()
        .instance()
        .set(&DataKey::RegisteredAirlineCount, &count);
}

pub fn get_participated_airline_count(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::ParticipatedAirlineCount)
        .unwrap_or(0)
}

pub fn set_participated_airline_count(env: &Env, count: u32) {
    env.storage()
        .instance()
        .set(&DataKey::ParticipatedAirlineCount, &count);
}

/// Post-increment nonce feeding the index derivation.
pub fn next_index_nonce(env: &Env) -> u64 {
    let nonce: u64 = env
        .storage()
        .instance()
        .get(&DataKey::IndexNonce)
        .unwrap_or(0);
    env.storage()
        .instance()
        .set(&DataKey::IndexNonce, &(nonce + 1));
    nonce
}

pub fn get_airline(env: &Env, airline: &Address) -> Airline {
    env.storage()
        .persistent()
        .get(&DataKey::Airline(airline.clone()))
        .unwrap_or(Airline {
            registered: false,
            participated: false,
        })
}

pub fn set_airline(env: &Env, airline: &Address, state: &Airline) {
    env.storage()
        .persistent()
        .set(&DataKey::Airline(airline.clone()), state);
}

pub fn get_voting_queue(env: &Env) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&DataKey::VotingQueue)
        .unwrap_or(Vec::new(env))
}

pub fn set_voting_queue(env: &Env, queue: &Vec<Address>) {
    env.storage().persistent().set(&DataKey::VotingQueue, queue);
}

pub fn get_votes(env: &Env, candidate: &Address) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&DataKey::Votes(candidate.clone()))
        .unwrap_or(Vec::new(env))
}

pub fn set_votes(env: &Env, candidate: &Address, votes: &Vec<Address>) {
    env.storage()
        .persistent()
        .set(&DataKey::Votes(candidate.clone()), votes);
}

pub fn remove_votes(env: &Env, candidate: &Address) {
    env.storage()
        .persistent()
        .remove(&DataKey::Votes(candidate.clone()));
}

pub fn get_flight(env: &Env, flight_key: &BytesN<32>) -> Option<Flight> {
    env.storage()
        .persistent()
        .get(&DataKey::Flight(flight_key.clone()))
}

pub fn set_flight(env: &Env, flight_key: &BytesN<32>, flight: &Flight) {
    env.storage()
        .persistent()
        .set(&DataKey::Flight(flight_key.clone()), flight);
}

pub fn get_flight_insurees(env: &Env, flight_key: &BytesN<32>) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&DataKey::FlightInsurees(flight_key.clone()))
        .unwrap_or(Vec::new(env))
}

pub fn add_flight_insuree(env: &Env, flight_key: &BytesN<32>, passenger: &Address) {
    let mut insurees = get_flight_insurees(env, flight_key);
    insurees.push_back(passenger.clone());
    env.storage()
        .persistent()
        .set(&DataKey::FlightInsurees(flight_key.clone()), &insurees);
}

pub fn get_insurance(
    env: &Env,
    passenger: &Address,
    flight_key: &BytesN<32>,
) -> Option<InsuranceRecord> {
    env.storage()
        .persistent()
        .get(&DataKey::Insurance(passenger.clone(), flight_key.clone()))
}

pub fn set_insurance(
    env: &Env,
    passenger: &Address,
    flight_key: &BytesN<32>,
    record: &InsuranceRecord,
) {
    env.storage().persistent().set(
        &DataKey::Insurance(passenger.clone(), flight_key.clone()),
        record,
    );
}

pub fn get_oracle(env: &Env, oracle: &Address) -> Option<Oracle> {
    env.storage()
        .persistent()
        .get(&DataKey::Oracle(oracle.clone()))
}

pub fn set_oracle(env: &Env, oracle: &Address, record: &Oracle) {
    env.storage()
        .persistent()
        .set(&DataKey::Oracle(oracle.clone()), record);
}

pub fn get_request(env: &Env, index: u32, flight_key: &BytesN<32>) -> Option<OracleRequest> {
    env.storage()
        .persistent()
        .get(&DataKey::Request(index, flight_key.clone()))
}

pub fn set_request(env: &Env, index: u32, flight_key: &BytesN<32>, request: &OracleRequest) {
    env.storage()
        .persistent()
        .set(&DataKey::Request(index, flight_key.clone()), request);
}
