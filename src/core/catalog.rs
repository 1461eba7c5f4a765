//! # Embedded Catalog / 嵌入式目录
//!
//! Tests that cannot be expressed in the plain test list: they need quoted
//! arguments (decryption secrets) or only apply to some builds, hosts or
//! decoder capabilities.
//!
//! 无法在普通测试列表中表达的测试：它们需要带引号的参数（解密密钥），
//! 或仅适用于某些构建、主机或解码器能力。

use crate::core::models::TestCase;
use crate::core::skip::{Predicate, SkipWhen, config_is_one, requires_config};
use crate::errors::ConfigError;

const LIBCRYPTO: &str = "HAVE_LIBCRYPTO";

struct Entry {
    name: &'static str,
    input: &'static str,
    output: &'static str,
    /// Shell-style argument string.
    args: &'static str,
    skip: fn() -> SkipWhen,
}

const ENTRIES: &[Entry] = &[
    Entry {
        name: "esp1",
        input: "02-sunrise-sunset-esp.pcap",
        output: "esp1.out",
        args: r#"-E "0x12345678@192.1.2.45 3des-cbc-hmac96:0x4043434545464649494a4a4c4c4f4f515152525454575758""#,
        skip: || requires_config(LIBCRYPTO),
    },
    Entry {
        name: "esp2",
        input: "08-sunrise-sunset-esp2.pcap",
        output: "esp2.out",
        args: r#"-E "0x12345678@192.1.2.45 3des-cbc-hmac96:0x43434545464649494a4a4c4c4f4f51515252545457575840,0xabcdabcd@192.0.1.1 3des-cbc-hmac96:0x434545464649494a4a4c4c4f4f5151525254545757584043""#,
        skip: || requires_config(LIBCRYPTO),
    },
    Entry {
        name: "esp3",
        input: "02-sunrise-sunset-esp.pcap",
        output: "esp1.out",
        args: r#"-E "3des-cbc-hmac96:0x4043434545464649494a4a4c4c4f4f515152525454575758""#,
        skip: || requires_config(LIBCRYPTO),
    },
    Entry {
        name: "esp4",
        input: "08-sunrise-sunset-esp2.pcap",
        output: "esp2.out",
        args: r#"-E "file @TESTDIR@/esp-secrets.txt""#,
        skip: || requires_config(LIBCRYPTO),
    },
    Entry {
        name: "esp5",
        input: "08-sunrise-sunset-aes.pcap",
        output: "esp5.out",
        args: r#"-E "file @TESTDIR@/esp-secrets.txt""#,
        skip: || requires_config(LIBCRYPTO),
    },
    Entry {
        name: "espudp1",
        input: "espudp1.pcap",
        output: "espudp1.out",
        args: r#"-nnnn -E "file @TESTDIR@/esp-secrets.txt""#,
        skip: || requires_config(LIBCRYPTO),
    },
    Entry {
        name: "ikev2pI2",
        input: "ikev2pI2.pcap",
        output: "ikev2pI2.out",
        args: r#"-v -v -v -v -E "file @TESTDIR@/ikev2pI2-secrets.txt""#,
        skip: || requires_config(LIBCRYPTO),
    },
    Entry {
        name: "isakmp4",
        input: "isakmp4500.pcap",
        output: "isakmp4.out",
        args: r#"-E "file @TESTDIR@/esp-secrets.txt""#,
        skip: || requires_config(LIBCRYPTO),
    },
    Entry {
        name: "bgp-as-path-oobr-ssl",
        input: "bgp-as-path-oobr.pcap",
        output: "bgp-as-path-oobr-ssl.out",
        args: "-vvv -e",
        skip: || requires_config(LIBCRYPTO),
    },
    Entry {
        name: "bgp-as-path-oobr-nossl",
        input: "bgp-as-path-oobr.pcap",
        output: "bgp-as-path-oobr-nossl.out",
        args: "-vvv -e",
        skip: || config_is_one(LIBCRYPTO),
    },
    Entry {
        name: "lmp-v-fptype1",
        input: "lmp.pcap",
        output: "lmp-v-fptype1.out",
        args: "-T lmp -v",
        skip: || SkipWhen::any([Predicate::FpType("9878".to_string())]),
    },
    Entry {
        name: "lmp-v-fptype2",
        input: "lmp.pcap",
        output: "lmp-v-fptype2.out",
        args: "-T lmp -v",
        skip: || SkipWhen::any([Predicate::FpType("9877".to_string())]),
    },
    Entry {
        name: "ntp-time--64",
        input: "ntp.pcap",
        output: "ntp-time--64.out",
        args: "-vv",
        skip: || SkipWhen::any([Predicate::TimeTBits(32)]),
    },
    Entry {
        name: "ntp-time--utc",
        input: "ntp.pcap",
        output: "ntp-time--utc.out",
        args: "-vv --own-time-flag -tt",
        skip: SkipWhen::never,
    },
    Entry {
        name: "pktap-heap-overflow",
        input: "pktap-heap-overflow.pcap",
        output: "pktap-heap-overflow.out",
        args: "-v",
        skip: || SkipWhen::any([Predicate::HostOs("windows".to_string())]),
    },
    Entry {
        name: "isis-seg-fault-1-v",
        input: "isis-seg-fault-1.pcapng",
        output: "isis-seg-fault-1-v.out",
        args: "-v",
        skip: || {
            SkipWhen::any([Predicate::HostOs("windows".to_string())])
                .or(Predicate::TimeTBits(32))
        },
    },
];

/// The code-defined test cases, in declaration order.
pub fn embedded_cases() -> Result<Vec<TestCase>, ConfigError> {
    ENTRIES
        .iter()
        .map(|entry| {
            let args = shlex::split(entry.args).ok_or_else(|| ConfigError::MalformedEmbedded {
                name: entry.name.to_string(),
                args: entry.args.to_string(),
            })?;
            Ok(TestCase::new(entry.name, entry.input, entry.output, args).with_skip((entry.skip)()))
        })
        .collect()
}
