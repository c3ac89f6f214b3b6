//! Identifier types for pins, nodes and endpoints.

use std::sync::Arc;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Arc<str>);

        impl $name {
            /// Creates a new ID from a string.
            pub fn new(id: impl Into<Arc<str>>) -> Self {
                Self(id.into())
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id! {
    /// Identifier of a filter pin within one endpoint's topology.
    ///
    /// Cloning a `PinId` is cheap (Arc pointer copy, no heap allocation).
    ///
    /// # Example
    ///
    /// ```
    /// use pin_caps::PinId;
    ///
    /// let host = PinId::new("host_capture");
    /// assert_eq!(host, PinId::from("host_capture"));
    /// assert_eq!(host.as_str(), "host_capture");
    /// ```
    PinId
}

define_id! {
    /// Identifier of a processing node within one endpoint's topology.
    NodeId
}

define_id! {
    /// Identifier of a virtual audio endpoint in an
    /// [`EndpointRegistry`](crate::EndpointRegistry).
    EndpointId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_equality() {
        let a = PinId::new("mic");
        let b = PinId::new("mic");
        let c = PinId::new("speaker");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_id_display() {
        let id = NodeId::new("adc");
        assert_eq!(format!("{id}"), "adc");
    }

    #[test]
    fn test_id_from_string() {
        let id: EndpointId = String::from("mic_array").into();
        assert_eq!(id.as_str(), "mic_array");
    }

    #[test]
    fn test_id_hash_lookup_by_str() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(PinId::new("bridge"), 1);
        map.insert(PinId::new("host"), 2);
        map.insert(PinId::new("bridge"), 3); // replaces

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("bridge"), Some(&3));
    }
}
