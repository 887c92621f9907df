//! Key Encoding Module
//!
//! Turns keys into the byte sequence the shard router hashes. Each key type
//! picks its encoding at compile time through [`ShardKey`]:
//!
//! 1. Raw byte sequences are hashed as-is.
//! 2. [`ByteView`] wraps any `AsRef<[u8]>` type and hashes that view.
//! 3. Text is hashed as its UTF-8 bytes.
//! 4. [`TextView`] wraps any `Display` type and hashes its rendered text.
//!    Rendering happens once at construction and can fail.
//! 5. Fixed-width integers, `bool` and `char`, and slices/arrays/vecs of
//!    them, are hashed as their little-endian bytes.
//! 6. [`Structural`] serializes any `Serialize` type with bincode. This is
//!    the slow path. Like [`TextView`], it encodes at construction, so a
//!    key that cannot be encoded never reaches a shard.
//!
//! Equal keys must always produce the same bytes. `Borrow` pairs such as
//! `String`/`str` and `Vec<u8>`/`[u8]` encode identically, so lookups by
//! borrowed form route to the same shard as the owned key.

use std::borrow::Cow;
use std::fmt::{self, Write as _};
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::rc::Rc;
use std::sync::Arc;

use serde::Serialize;

use crate::cache::router::Fnv1a32;
use crate::error::{CacheError, Result};

// == Shard Key ==
/// A key that can be routed to a shard.
///
/// Implementations must write the same bytes for keys that compare equal.
/// Unequal keys writing the same bytes is only a hash collision.
pub trait ShardKey {
    /// Feeds this key's routing bytes into `hasher`.
    fn write_shard_bytes(&self, hasher: &mut Fnv1a32);
}

impl<T: ShardKey + ?Sized> ShardKey for &T {
    fn write_shard_bytes(&self, hasher: &mut Fnv1a32) {
        (**self).write_shard_bytes(hasher)
    }
}

impl<T: ShardKey + ?Sized> ShardKey for Box<T> {
    fn write_shard_bytes(&self, hasher: &mut Fnv1a32) {
        (**self).write_shard_bytes(hasher)
    }
}

impl<T: ShardKey + ?Sized> ShardKey for Arc<T> {
    fn write_shard_bytes(&self, hasher: &mut Fnv1a32) {
        (**self).write_shard_bytes(hasher)
    }
}

impl<T: ShardKey + ?Sized> ShardKey for Rc<T> {
    fn write_shard_bytes(&self, hasher: &mut Fnv1a32) {
        (**self).write_shard_bytes(hasher)
    }
}

// == Text ==
impl ShardKey for str {
    fn write_shard_bytes(&self, hasher: &mut Fnv1a32) {
        hasher.write(self.as_bytes())
    }
}

impl ShardKey for String {
    fn write_shard_bytes(&self, hasher: &mut Fnv1a32) {
        hasher.write(self.as_bytes())
    }
}

impl ShardKey for Cow<'_, str> {
    fn write_shard_bytes(&self, hasher: &mut Fnv1a32) {
        hasher.write(self.as_bytes())
    }
}

// == Fixed Width Scalars ==
/// Scalars with a fixed-width little-endian encoding.
pub trait FixedWidth: Copy + sealed::Sealed {
    fn write_le(&self, hasher: &mut Fnv1a32);

    /// Writes every item back to back.
    fn write_slice(items: &[Self], hasher: &mut Fnv1a32) {
        for item in items {
            item.write_le(hasher);
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

macro_rules! fixed_width {
    ($($ty:ty),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl FixedWidth for $ty {
                fn write_le(&self, hasher: &mut Fnv1a32) {
                    hasher.write(&self.to_le_bytes())
                }
            }

            impl ShardKey for $ty {
                fn write_shard_bytes(&self, hasher: &mut Fnv1a32) {
                    self.write_le(hasher)
                }
            }
        )*
    };
}

fixed_width!(u16, u32, u64, u128, i8, i16, i32, i64, i128);

impl sealed::Sealed for u8 {}

impl FixedWidth for u8 {
    fn write_le(&self, hasher: &mut Fnv1a32) {
        hasher.write(&[*self])
    }

    fn write_slice(items: &[Self], hasher: &mut Fnv1a32) {
        hasher.write(items)
    }
}

impl ShardKey for u8 {
    fn write_shard_bytes(&self, hasher: &mut Fnv1a32) {
        self.write_le(hasher)
    }
}

// Pointer-sized integers are widened to 8 bytes so routing does not depend
// on the target's pointer width.
impl sealed::Sealed for usize {}

impl FixedWidth for usize {
    fn write_le(&self, hasher: &mut Fnv1a32) {
        hasher.write(&(*self as u64).to_le_bytes())
    }
}

impl ShardKey for usize {
    fn write_shard_bytes(&self, hasher: &mut Fnv1a32) {
        self.write_le(hasher)
    }
}

impl sealed::Sealed for isize {}

impl FixedWidth for isize {
    fn write_le(&self, hasher: &mut Fnv1a32) {
        hasher.write(&(*self as i64).to_le_bytes())
    }
}

impl ShardKey for isize {
    fn write_shard_bytes(&self, hasher: &mut Fnv1a32) {
        self.write_le(hasher)
    }
}

impl sealed::Sealed for bool {}

impl FixedWidth for bool {
    fn write_le(&self, hasher: &mut Fnv1a32) {
        hasher.write(&[u8::from(*self)])
    }
}

impl ShardKey for bool {
    fn write_shard_bytes(&self, hasher: &mut Fnv1a32) {
        self.write_le(hasher)
    }
}

impl sealed::Sealed for char {}

impl FixedWidth for char {
    fn write_le(&self, hasher: &mut Fnv1a32) {
        hasher.write(&u32::from(*self).to_le_bytes())
    }
}

impl ShardKey for char {
    fn write_shard_bytes(&self, hasher: &mut Fnv1a32) {
        self.write_le(hasher)
    }
}

// == Sequences ==
// `[u8]` lands here too and is hashed as raw bytes.
impl<T: FixedWidth> ShardKey for [T] {
    fn write_shard_bytes(&self, hasher: &mut Fnv1a32) {
        T::write_slice(self, hasher)
    }
}

impl<T: FixedWidth> ShardKey for Vec<T> {
    fn write_shard_bytes(&self, hasher: &mut Fnv1a32) {
        T::write_slice(self, hasher)
    }
}

impl<T: FixedWidth, const N: usize> ShardKey for [T; N] {
    fn write_shard_bytes(&self, hasher: &mut Fnv1a32) {
        T::write_slice(self, hasher)
    }
}

// == Byte View ==
/// Routes a key by the bytes it exposes through `AsRef<[u8]>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ByteView<T>(pub T);

impl<T: AsRef<[u8]>> ShardKey for ByteView<T> {
    fn write_shard_bytes(&self, hasher: &mut Fnv1a32) {
        hasher.write(self.0.as_ref())
    }
}

// == Text View ==
/// Routes a key by its `Display` rendering.
///
/// The text is rendered once, when the key is built. A `Display` impl that
/// reports an error is rejected with [`CacheError::KeyEncoding`], so a
/// failed rendering is never hashed as empty text. The rendering must be a
/// pure function of the value.
#[derive(Debug, Clone)]
pub struct TextView<T> {
    value: T,
    text: Box<str>,
}

impl<T: fmt::Display> TextView<T> {
    // == Constructor ==
    /// Renders `value` for routing.
    pub fn new(value: T) -> Result<Self> {
        let mut text = String::new();
        write!(text, "{value}").map_err(|err| CacheError::key_encoding::<T>(err))?;
        Ok(Self {
            value,
            text: text.into_boxed_str(),
        })
    }
}

impl<T> TextView<T> {
    /// Returns the text routing hashes.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> Deref for TextView<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: PartialEq> PartialEq for TextView<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: Eq> Eq for TextView<T> {}

impl<T: Hash> Hash for TextView<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state)
    }
}

impl<T> ShardKey for TextView<T> {
    fn write_shard_bytes(&self, hasher: &mut Fnv1a32) {
        hasher.write(self.text.as_bytes())
    }
}

// == Structural ==
/// Routes an arbitrary `Serialize` key by its bincode encoding.
///
/// The encoding is computed once, when the key is built, so a key that
/// cannot be serialized is rejected with [`CacheError::KeyEncoding`] before
/// it ever reaches a shard. Types whose serialized form depends on anything
/// but their value (for example `HashMap` iteration order) must not be used;
/// prefer `BTreeMap`/`BTreeSet` inside structural keys.
#[derive(Debug, Clone)]
pub struct Structural<T> {
    value: T,
    encoded: Box<[u8]>,
}

impl<T: Serialize> Structural<T> {
    // == Constructor ==
    /// Encodes `value` for routing.
    pub fn new(value: T) -> Result<Self> {
        let encoded = bincode::serialize(&value)
            .map_err(|err| CacheError::key_encoding::<T>(err))?;
        Ok(Self {
            value,
            encoded: encoded.into_boxed_slice(),
        })
    }
}

impl<T> Structural<T> {
    /// Returns the bytes routing hashes.
    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> Deref for Structural<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: PartialEq> PartialEq for Structural<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: Eq> Eq for Structural<T> {}

impl<T: Hash> Hash for Structural<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state)
    }
}

impl<T> ShardKey for Structural<T> {
    fn write_shard_bytes(&self, hasher: &mut Fnv1a32) {
        hasher.write(&self.encoded)
    }
}
