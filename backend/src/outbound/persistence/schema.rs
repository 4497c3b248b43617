//! Diesel table definitions for the SQLite schema.
//!
//! These definitions must match `migrations/` exactly. `diesel print-schema`
//! against a migrated database regenerates them.

diesel::table! {
    /// Registration holders (titulares), keyed by unique name.
    clients (id) {
        id -> Integer,
        /// Unique holder name.
        holder_name -> Text,
    }
}

diesel::table! {
    /// Products, keyed by unique reference code.
    products (id) {
        id -> Integer,
        product_name -> Text,
        /// Unique reference code.
        reference -> Text,
    }
}

diesel::table! {
    /// One stability study per product batch.
    studies (id) {
        id -> Integer,
        /// Unique batch code.
        lote -> Text,
        client_id -> Integer,
        product_id -> Integer,
        sanitary_registration -> Nullable<Text>,
        manufacturer -> Nullable<Text>,
        study_site -> Nullable<Text>,
        description -> Nullable<Text>,
        tests_performed -> Nullable<Text>,
        observations -> Nullable<Text>,
        units -> Nullable<Integer>,
        release_date -> Nullable<Date>,
        chamber_start_date -> Nullable<Date>,
        study_start_date -> Nullable<Date>,
        study_end_date -> Nullable<Date>,
        /// Closed studies reject updates.
        closed -> Bool,
        created_at -> Timestamp,
    }
}

diesel::table! {
    /// Laboratory measurements owned by a study (SQL table `results`).
    #[sql_name = "results"]
    study_results (id) {
        id -> Integer,
        /// Owning study; rows cascade on study deletion.
        study_id -> Integer,
        stability_type -> Text,
        analysis -> Nullable<Text>,
        parameter -> Text,
        time_point -> Text,
        specification -> Nullable<Text>,
        outcome -> Nullable<Text>,
    }
}

diesel::joinable!(studies -> clients (client_id));
diesel::joinable!(studies -> products (product_id));
diesel::joinable!(study_results -> studies (study_id));

diesel::allow_tables_to_appear_in_same_query!(clients, products, studies, study_results);
