//! Helper macro generating port error enums.
//!
//! Every variant is a struct variant (`Variant {}` when it carries nothing)
//! and gets a `thiserror` message plus a snake_case constructor taking one
//! `impl Into<_>` argument per field.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),* $(,)? } => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field: $ty),* },
            )*
        }

        impl $name {
            ::paste::paste! {
                $(
                    #[doc = concat!("Build [`", stringify!($name), "::", stringify!($variant), "`].")]
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                        Self::$variant { $($field: $field.into()),* }
                    }
                )*
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    define_port_error! {
        pub enum LedgerPortError {
            Unavailable {} => "ledger unavailable",
            Rejected { lote: String } => "rejected lote {lote}",
            Partial { lote: String, written: usize } => "lote {lote}: wrote {written} rows",
        }
    }

    #[test]
    fn empty_variants_get_argumentless_constructors() {
        assert_eq!(LedgerPortError::unavailable(), LedgerPortError::Unavailable {});
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = LedgerPortError::rejected("L-001");
        assert_eq!(err.to_string(), "rejected lote L-001");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = LedgerPortError::partial("L-002", 3_usize);
        assert_eq!(err.to_string(), "lote L-002: wrote 3 rows");
    }
}
