//! Typed per-request storage.
//!
//! Middleware use this to hand request-scoped values (the loaded session,
//! the signed-in user) to the handler without global state.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One value per type, shared by clones of the same request.
#[derive(Clone, Default)]
pub struct Extensions {
	map: Arc<Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>>,
}

impl Extensions {
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores `value`, replacing any previous value of the same type.
	///
	/// # Examples
	///
	/// ```
	/// use lectern_http::Extensions;
	///
	/// let extensions = Extensions::new();
	/// extensions.insert(7i64);
	/// extensions.insert(8i64);
	/// assert_eq!(extensions.get::<i64>(), Some(8));
	/// ```
	pub fn insert<T: Send + Sync + 'static>(&self, value: T) {
		let mut map = self.map.lock().unwrap_or_else(|e| e.into_inner());
		map.insert(TypeId::of::<T>(), Box::new(value));
	}

	/// Returns a clone of the stored value.
	pub fn get<T>(&self) -> Option<T>
	where
		T: Clone + Send + Sync + 'static,
	{
		let map = self.map.lock().unwrap_or_else(|e| e.into_inner());
		map.get(&TypeId::of::<T>())
			.and_then(|boxed| boxed.downcast_ref::<T>())
			.cloned()
	}

	pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
		let map = self.map.lock().unwrap_or_else(|e| e.into_inner());
		map.contains_key(&TypeId::of::<T>())
	}

	/// Takes the stored value out.
	pub fn remove<T: Send + Sync + 'static>(&self) -> Option<T> {
		let mut map = self.map.lock().unwrap_or_else(|e| e.into_inner());
		let boxed = map.remove(&TypeId::of::<T>())?;
		boxed.downcast::<T>().ok().map(|value| *value)
	}
}

impl std::fmt::Debug for Extensions {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let len = self.map.lock().map(|m| m.len()).unwrap_or(0);
		f.debug_struct("Extensions").field("len", &len).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[derive(Clone, Debug, PartialEq)]
	struct Marker(&'static str);

	#[rstest]
	fn test_clones_share_storage() {
		// Arrange
		let extensions = Extensions::new();
		let clone = extensions.clone();

		// Act
		clone.insert(Marker("from clone"));

		// Assert
		assert_eq!(extensions.get::<Marker>(), Some(Marker("from clone")));
	}

	#[rstest]
	fn test_remove_takes_value() {
		let extensions = Extensions::new();
		extensions.insert(Marker("x"));

		assert_eq!(extensions.remove::<Marker>(), Some(Marker("x")));
		assert!(!extensions.contains::<Marker>());
		assert_eq!(extensions.remove::<Marker>(), None);
	}
}
