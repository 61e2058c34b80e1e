//! Conformance vectors: complete node responses, one per shape of result.
//!
//! Every vector must decode with the strict JSON codec and survive a trip
//! through CBOR and the attribute format unchanged.

/// A recorded chain-sync response.
#[derive(Debug, Clone, Copy)]
pub struct Vector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// The response exactly as the node sent it.
    pub json: &'static str,
}

/// Get all conformance vectors.
pub fn all_vectors() -> Vec<Vector> {
    vec![
        Vector {
            name: "roll_forward_alonzo_vasil",
            json: include_str!("../vectors/roll_forward_alonzo_vasil.json"),
        },
        Vector {
            name: "roll_forward_babbage",
            json: include_str!("../vectors/roll_forward_babbage.json"),
        },
        Vector {
            name: "roll_forward_byron",
            json: include_str!("../vectors/roll_forward_byron.json"),
        },
        Vector {
            name: "roll_backward_point",
            json: include_str!("../vectors/roll_backward_point.json"),
        },
        Vector {
            name: "roll_backward_origin",
            json: include_str!("../vectors/roll_backward_origin.json"),
        },
        Vector {
            name: "intersection_found",
            json: include_str!("../vectors/intersection_found.json"),
        },
        Vector {
            name: "intersection_not_found",
            json: include_str!("../vectors/intersection_not_found.json"),
        },
    ]
}

/// Look up a vector by name.
pub fn vector(name: &str) -> Option<Vector> {
    all_vectors().into_iter().find(|v| v.name == name)
}
