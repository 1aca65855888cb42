//! Test fixtures.

pub(crate) const TEST_SIGNED_CREDENTIAL: &str = r##"{
    "@context": [
      "https://www.w3.org/2018/credentials/v1",
      "https://schema.org/"
    ],
    "id": "urn:uuid:4b7a9c1e-3f2d-4e8a-9b6c-1d2e3f4a5b6c",
    "type": ["VerifiableCredential", "AccountCredential"],
    "holder": {
      "id": "did:example:holder"
    },
    "credentialSubject": {
      "id": "did:example:holder",
      "data": {
        "@type": "Person",
        "givenName": "Jane",
        "familyName": "Doe"
      }
    },
    "issuanceDate": "2024-01-01T00:00:00Z",
    "expirationDate": "2034-01-01T00:00:00Z",
    "issuer": "did:example:issuer",
    "proof": {
      "type": "EcdsaSecp256k1Signature2019",
      "created": "2024-01-01T00:00:00Z",
      "proofPurpose": "assertionMethod",
      "verificationMethod": "did:example:issuer#key-1",
      "jws": "eyJhbGciOiJFUzI1NksiLCJiNjQiOmZhbHNlLCJjcml0IjpbImI2NCJdfQ..c2lnbmF0dXJl"
    }
  }"##;

pub(crate) const TEST_SIGNED_PRESENTATION: &str = r##"{
    "@context": [
      "https://www.w3.org/2018/credentials/v1"
    ],
    "id": "urn:uuid:0e3b5a7c-2d4f-4a6b-8c9d-7e6f5a4b3c2d",
    "type": ["VerifiablePresentation"],
    "holder": {
      "id": "did:example:holder"
    },
    "verifiableCredential": [
      {
        "@context": [
          "https://www.w3.org/2018/credentials/v1",
          "https://schema.org/"
        ],
        "id": "urn:uuid:4b7a9c1e-3f2d-4e8a-9b6c-1d2e3f4a5b6c",
        "type": ["VerifiableCredential", "AccountCredential"],
        "holder": {
          "id": "did:example:holder#key-1"
        },
        "credentialSubject": {
          "id": "did:example:holder",
          "data": {
            "@type": "Person",
            "givenName": "Jane",
            "familyName": "Doe"
          }
        },
        "issuanceDate": "2024-01-01T00:00:00Z",
        "issuer": "did:example:issuer",
        "proof": {
          "type": "EcdsaSecp256k1Signature2019",
          "created": "2024-01-01T00:00:00Z",
          "proofPurpose": "assertionMethod",
          "verificationMethod": "did:example:issuer#key-1",
          "jws": "eyJhbGciOiJFUzI1NksiLCJiNjQiOmZhbHNlLCJjcml0IjpbImI2NCJdfQ..c2lnbmF0dXJl"
        }
      }
    ],
    "presentation_submission": {
      "id": "submission-1",
      "definition_id": "account-definition",
      "descriptor_map": [
        {
          "id": "account_input",
          "format": "ldp_vc",
          "path": "$.verifiableCredential[0]"
        }
      ]
    },
    "proof": {
      "type": "EcdsaSecp256k1Signature2019",
      "created": "2024-01-02T00:00:00Z",
      "proofPurpose": "authentication",
      "verificationMethod": "did:example:holder#key-1",
      "challenge": "challenge-123",
      "domain": "verifier.example.com",
      "jws": "eyJhbGciOiJFUzI1NksiLCJiNjQiOmZhbHNlLCJjcml0IjpbImI2NCJdfQ..c2lnbmF0dXJl"
    }
  }"##;
