use serde::Serialize;
use std::num::Wrapping;

/// When we have separate values it's useful to run a progressive
/// version of djb2 where we pretend that we're still looping over
/// the same value. Used to derive operation keys from the static query key
/// and the variables.
pub fn progressive_hash<V: Serialize>(h: u32, x: &V) -> u64 {
    let bytes = match bincode::serialize(x) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "variables could not be serialized for hashing");
            Vec::new()
        }
    };

    let mut h = Wrapping(h as u64);

    for byte in bytes {
        h = (h << 5) + h + Wrapping(byte as u64)
    }

    h.0
}

/// Build an [`Extensions`](../type.Extensions.html) map from a list of extension values.
///
/// ```
/// # #[derive(Clone)]
/// # struct Marker(u8);
/// let extensions = roster::ext![Marker(3)];
/// assert_eq!(extensions.get::<Marker>().map(|m| m.0), Some(3));
/// ```
#[macro_export]
macro_rules! ext {
    ($($x: expr),*) => {
        {
            #[allow(unused_mut)]
            let mut typemap = $crate::ExtensionMap::new();
            $(
                typemap.insert($x);
            )*
            ::std::sync::Arc::new(typemap)
        }
    };
}

#[cfg(test)]
mod tests {
    use super::progressive_hash;

    #[derive(Serialize)]
    struct Variables {
        id: String
    }

    #[test]
    fn same_variables_hash_to_the_same_key() {
        let a = progressive_hash(42, &Variables { id: "1".into() });
        let b = progressive_hash(42, &Variables { id: "1".into() });
        assert_eq!(a, b);
    }

    #[test]
    fn different_variables_or_queries_hash_differently() {
        let base = progressive_hash(42, &Variables { id: "1".into() });
        assert_ne!(base, progressive_hash(42, &Variables { id: "2".into() }));
        assert_ne!(base, progressive_hash(43, &Variables { id: "1".into() }));
    }

    #[test]
    fn unit_variables_hash_to_the_seed() {
        assert_eq!(progressive_hash(7, &()), 7);
    }
}
