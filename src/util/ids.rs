use uuid::Uuid;

const ID_LEN: usize = 12;

/// Generate a short opaque identifier for ledger and audit records.
/// Taken from the front of a random v4 UUID, so collisions within one
/// session are not a practical concern.
pub fn new_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(ID_LEN);
    id
}
