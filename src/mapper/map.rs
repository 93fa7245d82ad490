// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use crate::{
    events::Event,
    store::{MapOutcome, Store},
    wire::map::MapRecord,
};

/// Grounded on `original_source/.../map.py::MapInfoStore.digest_map`: the
/// payload dispatch (`SrvInfo`/`AuthInfo`/`Path` mutate the store and yield
/// an identity event; `AppInfo`/`PrgInfo`/`XfrInfo` are decoded but inert)
/// lives in [`Store::ingest_map`] itself since it's pure bookkeeping with no
/// correlation lookups of its own to skip on failure.
pub fn digest(store: &Store, stod: i32, record: &MapRecord) -> Option<Event> {
    match store.ingest_map(stod, record) {
        MapOutcome::Server(server) => Some(Event::Server(server)),
        MapOutcome::User(user) => Some(Event::User(user)),
        MapOutcome::Access(access) => Some(Event::Access(access)),
        MapOutcome::None => None,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::wire::map::MapRecord;

    fn srvinfo_record() -> MapRecord {
        let mut body = 3u32.to_be_bytes().to_vec();
        body.extend_from_slice(b"xrootd/alice.1.1:42@host.example.org\n");
        body.extend_from_slice(b"pgm=xrootd&ver=5.6.0&inst=prod&port=1094&site=T2");
        MapRecord::decode(b'=', &body, 0).unwrap()
    }

    fn path_record(dictid: u32) -> MapRecord {
        let mut body = dictid.to_be_bytes().to_vec();
        body.extend_from_slice(b"xrootd/alice.1.1:42@host.example.org\n");
        body.extend_from_slice(b"/data/a");
        MapRecord::decode(b'd', &body, 0).unwrap()
    }

    #[test]
    fn srvinfo_yields_server_event() {
        let store = Store::new(Duration::from_secs(30));
        let event = digest(&store, 1, &srvinfo_record());
        assert!(matches!(event, Some(Event::Server(_))));
    }

    #[test]
    fn path_before_server_yields_nothing() {
        let store = Store::new(Duration::from_secs(30));
        assert!(digest(&store, 1, &path_record(7)).is_none());
    }

    #[test]
    fn path_after_server_yields_access_event() {
        let store = Store::new(Duration::from_secs(30));
        digest(&store, 1, &srvinfo_record());
        let event = digest(&store, 1, &path_record(7));
        assert!(matches!(event, Some(Event::Access(_))));
    }
}
