//! URL-safe tokens for search states.
//!
//! A token is the packed JSON of a [`SerializedState`], deflated and encoded as unpadded
//! URL-safe base64.

use crate::{
    pack_state, unpack_state, Deserializer, RawState, SerializedState, Serializer, StateError,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use semsearch_model::{Prefixes, SearchProfileStore};
use std::io::{Read, Write};

pub fn encode_state(state: &SerializedState) -> Result<String, StateError> {
    let packed = pack_state(serde_json::to_value(state)?);
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(serde_json::to_string(&packed)?.as_bytes())?;
    Ok(URL_SAFE_NO_PAD.encode(encoder.finish()?))
}

pub fn decode_state(token: &str) -> Result<SerializedState, StateError> {
    let compressed = URL_SAFE_NO_PAD.decode(token.trim())?;
    let mut json = String::new();
    DeflateDecoder::new(compressed.as_slice()).read_to_string(&mut json)?;
    let packed = serde_json::from_str(&json)?;
    Ok(serde_json::from_value(unpack_state(packed))?)
}

/// Serializes and encodes a session state in one go.
pub fn state_to_token(prefixes: &Prefixes, state: &RawState) -> Result<String, StateError> {
    encode_state(&Serializer::new(prefixes).serialize_state(state)?)
}

/// Decodes a token and resolves it against `profile`.
pub fn state_from_token(
    profile: &SearchProfileStore,
    prefixes: &Prefixes,
    token: &str,
) -> Result<RawState, StateError> {
    let state = decode_state(token)?;
    tracing::debug!("Restoring search state from {} byte token", token.len());
    Deserializer::new(profile, prefixes).deserialize_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SerializedConjunct, SerializedConjunctBody, SerializedSearch};
    use serde_json::json;

    #[test]
    fn tokens_are_url_safe() -> Result<(), StateError> {
        let state = SerializedState {
            search: Some(SerializedSearch {
                domain: "ex:Person".into(),
                conjuncts: vec![SerializedConjunct {
                    unique_id: Some(7),
                    relation: Some(SerializedConjunctBody {
                        range: "ex:Place".into(),
                        relation: Some("ex:birthPlace".into()),
                        disjuncts: Some(json!([["Resource", {"iri": "ex:London", "label": "London"}]])),
                    }),
                    text: None,
                }],
            }),
            facet: None,
            result: Some(json!({"table": {"page": 3}})),
        };
        let token = encode_state(&state)?;
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(decode_state(&token)?, state);
        Ok(())
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(decode_state("not a token!"), Err(StateError::Token(_))));
        let not_deflated = URL_SAFE_NO_PAD.encode(b"{\"s\":{}}");
        assert!(decode_state(&not_deflated).is_err());
    }
}
