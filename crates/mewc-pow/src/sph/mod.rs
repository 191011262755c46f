//! In-crate ports of the SHA-3-candidate digests that back X16R but have
//! no maintained crates: BLAKE, BMW, CubeHash, Luffa, SHAvite, SIMD, ECHO,
//! Hamsi and Fugue, plus the AES building blocks several of them share.

mod aes;
mod blake512;
mod bmw512;
mod cubehash;
mod echo;
mod fugue;
mod hamsi;
mod luffa;
mod shavite;
mod simd;

pub use blake512::blake512;
pub use bmw512::bmw512;
pub use cubehash::cubehash512;
pub use echo::echo512;
pub use fugue::fugue512;
pub use hamsi::hamsi512;
pub use luffa::luffa512;
pub use shavite::shavite512;
pub use simd::simd512;
