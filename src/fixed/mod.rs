//! Fixed-point complex samples: the bus encoding and the bit-accurate
//! arithmetic the generated datapath performs.

pub mod types;
pub mod codec;

pub use codec::{decode, decode_vector, encode, encode_vector, pack_uints, unpack_uints};
pub use types::{ComplexFixed, Fixed};
