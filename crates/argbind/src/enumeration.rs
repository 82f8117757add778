//! Binding to caller-defined enumeration types.
//!
//! A type becomes bindable by implementing [`NamedEnumeration`]. Types owned by another
//! crate cannot implement it, so they are registered at runtime with [`register`] and bound
//! through the [`Registered`] adapter instead.
//!
//! Several names may map to the same value. All of them parse; the first one registered is
//! used when the value is displayed.

use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::{OnceLock, PoisonError, RwLock};

use crate::value::{ConversionError, Value};

/// Name to value table, in registration order.
pub type EnumerationNames<T> = Vec<(Cow<'static, str>, T)>;

pub trait NamedEnumeration: Sized + Clone + PartialEq {
    fn enumeration_names() -> EnumerationNames<Self>;
}

impl<T: NamedEnumeration> Value for T {
    fn parse_arg(token: &str) -> Result<Self, ConversionError> {
        let names = T::enumeration_names();
        match names.iter().find(|(name, _)| name == token) {
            Some((_, value)) => Ok(value.clone()),
            None => Err(ConversionError::InvalidName {
                token: token.to_string(),
                names: names.into_iter().map(|(name, _)| name.into_owned()).collect(),
            }),
        }
    }

    fn to_arg(&self) -> String {
        T::enumeration_names()
            .into_iter()
            .find(|(_, value)| value == self)
            .map(|(name, _)| name.into_owned())
            .unwrap_or_else(|| "<UNKNOWN_VALUE>".to_string())
    }

    fn type_name() -> String {
        short_type_name::<T>()
    }
}

/// The values of a named enumeration, in registration order, duplicates included.
///
/// Handy for building a `ValueList` validator over an enumeration.
pub fn enumeration_values<T: NamedEnumeration>() -> Vec<T> {
    T::enumeration_names()
        .into_iter()
        .map(|(_, value)| value)
        .collect()
}

type Table = HashMap<TypeId, Box<dyn Any + Send + Sync>>;

fn table() -> &'static RwLock<Table> {
    static TABLE: OnceLock<RwLock<Table>> = OnceLock::new();
    TABLE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Register the name table for a type that cannot implement [`NamedEnumeration`].
///
/// Registering the same type again replaces the earlier table.
pub fn register<T, N, I>(names: I)
where
    T: Clone + Send + Sync + 'static,
    N: Into<Cow<'static, str>>,
    I: IntoIterator<Item = (N, T)>,
{
    let names: EnumerationNames<T> = names
        .into_iter()
        .map(|(name, value)| (name.into(), value))
        .collect();
    tracing::debug!(
        type_name = %short_type_name::<T>(),
        count = names.len(),
        "registered enumeration names"
    );
    table()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(TypeId::of::<T>(), Box::new(names));
}

/// The registered name table for `T`, empty if nothing was registered.
pub fn registered_names<T>() -> EnumerationNames<T>
where
    T: Clone + Send + Sync + 'static,
{
    table()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&TypeId::of::<T>())
        .and_then(|entry| entry.downcast_ref::<EnumerationNames<T>>())
        .cloned()
        .unwrap_or_default()
}

/// Adapter binding a foreign type through the runtime table filled by [`register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Registered<T>(pub T);

impl<T> Registered<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Registered<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Registered<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T> NamedEnumeration for Registered<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn enumeration_names() -> EnumerationNames<Self> {
        registered_names::<T>()
            .into_iter()
            .map(|(name, value)| (name, Registered(value)))
            .collect()
    }
}

fn short_type_name<T>() -> String {
    let full = std::any::type_name::<T>();
    // Strip module paths, keeping generic arguments readable.
    let base = full.split('<').next().unwrap_or(full);
    let tail = base.rsplit("::").next().unwrap_or(base);
    tail.to_string()
}
