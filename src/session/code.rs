use rand::Rng;

/// Length of a session code.
pub const CODE_LEN: usize = 6;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Source of candidate session codes. Uniqueness is checked by the registry.
pub trait CodeSource: Send {
    fn next_code(&mut self) -> String;
}

/// Six uppercase alphanumerics from the thread RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCodes;

impl CodeSource for RandomCodes {
    fn next_code(&mut self) -> String {
        generate_code()
    }
}

pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}
