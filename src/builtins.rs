// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::{BTreeSet, HashSet};

use lazy_static::lazy_static;

/// Lookup deciding whether an operator names a function the evaluator
/// provides natively.
pub trait BuiltinRegistry {
    fn is_builtin(&self, name: &str) -> bool;
}

const OPERATORS: &[&str] = &[
    "eq", "assign", "equal", "neq", "lt", "lte", "gt", "gte", "plus", "minus", "mul", "div", "rem",
    "and", "or", "internal.member_2", "internal.member_3",
];

const AGGREGATES: &[&str] = &["all", "any", "count", "max", "min", "product", "sort", "sum"];

const ARRAYS: &[&str] = &["array.concat", "array.reverse", "array.slice"];

const NUMBERS: &[&str] = &[
    "abs", "ceil", "floor", "numbers.range", "numbers.range_step", "rand.intn", "round",
];

const BITS: &[&str] = &[
    "bits.and", "bits.lsh", "bits.negate", "bits.or", "bits.rsh", "bits.xor",
];

const SETS: &[&str] = &["intersection", "union"];

const OBJECTS: &[&str] = &[
    "json.filter", "json.patch", "json.remove", "object.filter", "object.get", "object.keys",
    "object.remove", "object.subset", "object.union", "object.union_n",
];

const STRINGS: &[&str] = &[
    "concat", "contains", "endswith", "format_int", "indexof", "indexof_n", "lower", "replace",
    "split", "sprintf", "startswith", "strings.any_prefix_match", "strings.any_suffix_match",
    "strings.count", "strings.render_template", "strings.replace_n", "strings.reverse",
    "substring", "trim", "trim_left", "trim_prefix", "trim_right", "trim_space", "trim_suffix",
    "upper",
];

const REGEX: &[&str] = &[
    "regex.find_all_string_submatch_n", "regex.find_n", "regex.globs_match", "regex.is_valid",
    "regex.match", "regex.replace", "regex.split", "regex.template_match", "glob.match",
    "glob.quote_meta",
];

const TYPES: &[&str] = &[
    "is_array", "is_boolean", "is_null", "is_number", "is_object", "is_set", "is_string",
    "type_name",
];

const CONVERSIONS: &[&str] = &["to_number"];

const ENCODING: &[&str] = &[
    "base64.decode", "base64.encode", "base64.is_valid", "base64url.decode", "base64url.encode",
    "base64url.encode_no_pad", "hex.decode", "hex.encode", "json.is_valid", "json.marshal",
    "json.marshal_with_options", "json.unmarshal", "urlquery.decode", "urlquery.decode_object",
    "urlquery.encode", "urlquery.encode_object", "yaml.is_valid", "yaml.marshal",
    "yaml.unmarshal",
];

const CRYPTO: &[&str] = &[
    "crypto.hmac.equal", "crypto.hmac.md5", "crypto.hmac.sha1", "crypto.hmac.sha256",
    "crypto.hmac.sha512", "crypto.md5", "crypto.sha1", "crypto.sha256",
];

const TOKENS: &[&str] = &[
    "io.jwt.decode", "io.jwt.decode_verify", "io.jwt.verify_es256", "io.jwt.verify_es384",
    "io.jwt.verify_es512", "io.jwt.verify_hs256", "io.jwt.verify_hs384", "io.jwt.verify_hs512",
    "io.jwt.verify_ps256", "io.jwt.verify_ps384", "io.jwt.verify_ps512", "io.jwt.verify_rs256",
    "io.jwt.verify_rs384", "io.jwt.verify_rs512",
];

const MISC: &[&str] = &[
    "graph.reachable", "graph.reachable_paths", "http.send", "json.match_schema",
    "json.verify_schema", "net.cidr_contains", "net.cidr_intersects", "net.cidr_is_valid",
    "net.cidr_merge", "opa.runtime", "print", "semver.compare", "semver.is_valid",
    "time.add_date", "time.clock", "time.date", "time.diff", "time.now_ns", "time.parse_ns",
    "time.parse_rfc3339_ns", "time.weekday", "trace", "units.parse", "units.parse_bytes",
    "uuid.parse", "uuid.rfc4122", "walk",
];

#[rustfmt::skip]
lazy_static! {
    static ref OPA_BUILTINS: HashSet<&'static str> = {
	let mut s : HashSet<&'static str> = HashSet::new();

	for group in [
	    OPERATORS, AGGREGATES, ARRAYS, NUMBERS, BITS, SETS, OBJECTS, STRINGS,
	    REGEX, TYPES, CONVERSIONS, ENCODING, CRYPTO, TOKENS, MISC,
	] {
	    s.extend(group.iter().copied());
	}

	s
    };
}

/// The standard OPA built-in functions, operators included.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpaBuiltins;

impl BuiltinRegistry for OpaBuiltins {
    fn is_builtin(&self, name: &str) -> bool {
        OPA_BUILTINS.contains(name)
    }
}

impl BuiltinRegistry for BTreeSet<String> {
    fn is_builtin(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl BuiltinRegistry for HashSet<String> {
    fn is_builtin(&self, name: &str) -> bool {
        self.contains(name)
    }
}
