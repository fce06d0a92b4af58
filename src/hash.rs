use std::hash::{BuildHasherDefault, Hasher};

/// Hasher for small integer keys (vertex indices, color bit patterns).
///
/// Sequential indices would cluster in the table with an identity hash, so each 32-bit word is folded in with a
/// Fibonacci multiply.
#[derive(Default)]
pub struct IndexHasher {
    state: u64,
}

impl Hasher for IndexHasher {
    fn write(&mut self, bytes: &[u8]) {
        for word in bytes.chunks(4) {
            let mut buffer = [0u8; 4];
            buffer[..word.len()].copy_from_slice(word);

            self.write_u32(u32::from_ne_bytes(buffer));
        }
    }

    #[inline]
    fn write_u32(&mut self, value: u32) {
        self.state = (self.state.rotate_left(5) ^ value as u64).wrapping_mul(0x9e3779b97f4a7c15);
    }

    fn finish(&self) -> u64 {
        self.state
    }
}

pub type BuildIndexHasher = BuildHasherDefault<IndexHasher>;
