// Funding API: project submission and PDF export.
// Ranking lives in matching, prose in narrative, documents in render; handlers
// only validate, sequence the collaborators and shape responses.

pub mod handlers;
