//! Primitive keyword table.
//!
//! The index of a keyword in [`PRIMITIVES`] is its one-byte opcode in the
//! binary wire format. The table is append-only across protocol upgrades.

/// All Michelson primitives ordered by opcode.
pub const PRIMITIVES: &[&str] = &[
    "parameter",
    "storage",
    "code",
    "False",
    "Elt",
    "Left",
    "None",
    "Pair",
    "Right",
    "Some",
    "True",
    "Unit",
    "PACK",
    "UNPACK",
    "BLAKE2B",
    "SHA256",
    "SHA512",
    "ABS",
    "ADD",
    "AMOUNT",
    "AND",
    "BALANCE",
    "CAR",
    "CDR",
    "CHECK_SIGNATURE",
    "COMPARE",
    "CONCAT",
    "CONS",
    "CREATE_ACCOUNT",
    "CREATE_CONTRACT",
    "IMPLICIT_ACCOUNT",
    "DIP",
    "DROP",
    "DUP",
    "EDIV",
    "EMPTY_MAP",
    "EMPTY_SET",
    "EQ",
    "EXEC",
    "FAILWITH",
    "GE",
    "GET",
    "GT",
    "HASH_KEY",
    "IF",
    "IF_CONS",
    "IF_LEFT",
    "IF_NONE",
    "INT",
    "LAMBDA",
    "LE",
    "LEFT",
    "LOOP",
    "LSL",
    "LSR",
    "LT",
    "MAP",
    "MEM",
    "MUL",
    "NEG",
    "NEQ",
    "NIL",
    "NONE",
    "NOT",
    "NOW",
    "OR",
    "PAIR",
    "PUSH",
    "RIGHT",
    "SIZE",
    "SOME",
    "SOURCE",
    "SENDER",
    "SELF",
    "STEPS_TO_QUOTA",
    "SUB",
    "SWAP",
    "TRANSFER_TOKENS",
    "SET_DELEGATE",
    "UNIT",
    "UPDATE",
    "XOR",
    "ITER",
    "LOOP_LEFT",
    "ADDRESS",
    "CONTRACT",
    "ISNAT",
    "CAST",
    "RENAME",
    "bool",
    "contract",
    "int",
    "key",
    "key_hash",
    "lambda",
    "list",
    "map",
    "big_map",
    "nat",
    "option",
    "or",
    "pair",
    "set",
    "signature",
    "string",
    "bytes",
    "mutez",
    "timestamp",
    "unit",
    "operation",
    "address",
    "SLICE",
    "DIG",
    "DUG",
    "EMPTY_BIG_MAP",
    "APPLY",
    "chain_id",
    "CHAIN_ID",
    "LEVEL",
    "SELF_ADDRESS",
    "never",
    "NEVER",
    "UNPAIR",
    "VOTING_POWER",
    "TOTAL_VOTING_POWER",
    "KECCAK",
    "SHA3",
    "PAIRING_CHECK",
    "bls12_381_g1",
    "bls12_381_g2",
    "bls12_381_fr",
    "sapling_state",
    "sapling_transaction_deprecated",
    "SAPLING_EMPTY_STATE",
    "SAPLING_VERIFY_UPDATE",
    "ticket",
    "TICKET_DEPRECATED",
    "READ_TICKET",
    "SPLIT_TICKET",
    "JOIN_TICKETS",
    "GET_AND_UPDATE",
    "chest",
    "chest_key",
    "OPEN_CHEST",
    "VIEW",
    "view",
    "constant",
    "SUB_MUTEZ",
    "tx_rollup_l2_address",
    "MIN_BLOCK_TIME",
    "sapling_transaction",
    "EMIT",
    "Lambda_rec",
    "LAMBDA_REC",
    "TICKET",
    "BYTES",
    "NAT",
];

/// Binary opcode of a primitive keyword.
pub fn opcode(keyword: &str) -> Option<u8> {
    PRIMITIVES
        .iter()
        .position(|p| *p == keyword)
        .and_then(|i| u8::try_from(i).ok())
}

/// Primitive keyword for a binary opcode.
pub fn keyword(opcode: u8) -> Option<&'static str> {
    PRIMITIVES.get(opcode as usize).copied()
}

/// Data constructors are capitalized (`Pair`, `Some`), instructions are
/// all-caps (`PUSH`), and types are lowercase (`pair`).
pub fn is_type_keyword(keyword: &str) -> bool {
    keyword
        .chars()
        .next()
        .map_or(false, |c| c.is_ascii_lowercase())
        && !matches!(keyword, "parameter" | "storage" | "code" | "view" | "constant")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_opcodes() {
        assert_eq!(opcode("parameter"), Some(0x00));
        assert_eq!(opcode("Pair"), Some(0x07));
        assert_eq!(opcode("Unit"), Some(0x0b));
        assert_eq!(opcode("int"), Some(0x5b));
        assert_eq!(opcode("address"), Some(0x6e));
        assert_eq!(opcode("chain_id"), Some(0x74));
        assert_eq!(opcode("NAT"), Some(0x9c));
    }

    #[test]
    fn keyword_inverse_of_opcode() {
        for (i, kw) in PRIMITIVES.iter().enumerate() {
            assert_eq!(keyword(i as u8), Some(*kw));
            assert_eq!(opcode(kw), Some(i as u8));
        }
        assert_eq!(keyword(0xff), None);
    }

    #[test]
    fn type_keywords() {
        assert!(is_type_keyword("pair"));
        assert!(is_type_keyword("big_map"));
        assert!(!is_type_keyword("Pair"));
        assert!(!is_type_keyword("PUSH"));
        assert!(!is_type_keyword("storage"));
    }
}
