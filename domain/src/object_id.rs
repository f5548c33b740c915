//! Public identifiers for domain objects.
//!
//! Every API-visible object carries an id of the form `<prefix>_<16 base62
//! chars>`, generated once at creation. The random part is drawn from the
//! thread-local CSPRNG.

use rand::Rng;

const RANDOM_PART_LENGTH: usize = 16;
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generates a fresh object id with the given prefix, e.g. `bot_Qy3kT0pXvZ7jW2aH`.
pub fn generate(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let random_part: String = (0..RANDOM_PART_LENGTH)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{prefix}{random_part}")
}

/// Whether `candidate` is a well-formed object id for the given prefix.
pub fn is_well_formed(prefix: &str, candidate: &str) -> bool {
    let Some(random_part) = candidate.strip_prefix(prefix) else {
        return false;
    };
    random_part.len() == RANDOM_PART_LENGTH
        && random_part.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_are_well_formed() {
        for prefix in ["bot_", "app_", "rec_", "proj_", "webhook_", "tran_"] {
            let id = generate(prefix);
            assert!(is_well_formed(prefix, &id), "malformed id: {id}");
            assert_eq!(id.len(), prefix.len() + RANDOM_PART_LENGTH);
        }
    }

    #[test]
    fn generated_ids_do_not_collide_casually() {
        let ids: HashSet<String> = (0..1000).map(|_| generate("bot_")).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn is_well_formed_rejects_bad_shapes() {
        assert!(!is_well_formed("bot_", "rec_0123456789abcdef"));
        assert!(!is_well_formed("bot_", "bot_short"));
        assert!(!is_well_formed("bot_", "bot_0123456789abcde!"));
        assert!(!is_well_formed("bot_", "bot_0123456789abcdef0"));
    }
}
