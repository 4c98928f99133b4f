//! C binding surface.
//!
//! Exports `const OrcaLanguage *tree_sitter_orca(void);`. The returned handle
//! is the address of this crate's [`Language`] descriptor, opaque on the C
//! side. It is *not* a tree-sitter runtime `TSLanguage`: the tree-sitter C
//! library reads a generated parse-table layout that this descriptor does not
//! have, so the handle must never reach `ts_parser_set_language` or a binding
//! built on it. Native callers pass it back to Rust, which resolves it with
//! [`language_from_raw`].

use crate::language::{LANGUAGE, Language};

/// Opaque C-side view of [`Language`].
#[repr(C)]
pub struct OrcaLanguage {
    _private: [u8; 0],
}

/// Returns the grammar descriptor handle. Never null, identical on every call.
#[unsafe(no_mangle)]
pub extern "C" fn tree_sitter_orca() -> *const OrcaLanguage {
    (&LANGUAGE as *const Language).cast()
}

/// Recover the descriptor from a handle previously returned by
/// [`tree_sitter_orca`].
///
/// # Safety
/// `ptr` must be null or a value returned by [`tree_sitter_orca`].
pub unsafe fn language_from_raw(ptr: *const OrcaLanguage) -> Option<&'static Language> {
    // SAFETY: the only non-null values callers may pass point at `LANGUAGE`.
    unsafe { ptr.cast::<Language>().as_ref() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::language;

    #[test]
    fn symbol_is_non_null_and_stable() {
        let a = tree_sitter_orca();
        let b = tree_sitter_orca();
        assert!(!a.is_null());
        assert_eq!(a, b);
    }

    #[test]
    fn raw_pointer_resolves_to_the_singleton() {
        let lang = unsafe { language_from_raw(tree_sitter_orca()) }.unwrap();
        assert!(std::ptr::eq(lang, language()));
        assert_eq!(lang.name(), "orca");
        assert!(unsafe { language_from_raw(std::ptr::null()) }.is_none());
    }

    #[test]
    fn handle_is_the_address_of_the_rust_descriptor() {
        let handle = tree_sitter_orca().cast::<Language>();
        assert_eq!(handle, language() as *const Language);
        assert_eq!(unsafe { &*handle }.abi_version(), crate::ABI_VERSION);
    }

    #[test]
    fn callable_from_many_threads() {
        let addr = tree_sitter_orca() as usize;
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| tree_sitter_orca() as usize))
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), addr);
        }
    }
}
