// VLAN summary blocks.
//
// Each `<pre>` on the summary page describes one VLAN:
//
//   VLAN Name                        Tag
//   ENG-TEST                         42
//   ______________________________________
//   First Address  Last Address  Gateway   Subnet Mask
//   10.0.0.0       10.0.0.255    10.0.0.1  255.255.255.0

use std::net::Ipv4Addr;
use std::sync::LazyLock;

use ipnetwork::{Ipv4Network, ipv4_mask_to_prefix};
use scraper::{Html, Selector};

use super::{Extraction, ParseIssue};
use crate::model::VlanRecord;

const SUBNET_HEADER: &str = "Subnet Mask";
const TAG_HEADER: &str = "Tag";
const TAG_TERMINATOR: &str = "____";

static PRE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("pre").expect("static selector"));

/// One record per `<pre>` block, in document order.
pub fn extract_vlans(page: &str) -> Extraction<VlanRecord> {
    let blocks: Vec<String> = {
        let document = Html::parse_document(page);
        document
            .select(&PRE)
            .map(|pre| pre.text().collect())
            .collect()
    };

    let mut out = Extraction::default();
    for (index, block) in blocks.iter().enumerate() {
        let record = parse_block(index, block, &mut out);
        out.push(record);
    }
    out
}

fn parse_block(index: usize, block: &str, out: &mut Extraction<VlanRecord>) -> VlanRecord {
    let subnet = match section_after(block, SUBNET_HEADER) {
        Some(rest) => match parse_subnet(index, rest.lines().next().unwrap_or_default()) {
            Ok(network) => network.to_string(),
            Err(issue) => {
                out.report(issue);
                String::new()
            }
        },
        None => {
            out.report(ParseIssue::MissingHeader {
                block: index,
                header: SUBNET_HEADER,
            });
            String::new()
        }
    };

    let (name, tag) = match section_after(block, TAG_HEADER) {
        Some(rest) => {
            let section = rest.split(TAG_TERMINATOR).next().unwrap_or_default();
            let tokens: Vec<&str> = section.split_whitespace().collect();
            match tokens.as_slice() {
                [name, tag] => ((*name).to_owned(), (*tag).to_owned()),
                [name] => ((*name).to_owned(), String::new()),
                other => {
                    out.report(ParseIssue::TagTokens {
                        block: index,
                        found: other.len(),
                    });
                    let name = other.first().map(|s| (*s).to_owned()).unwrap_or_default();
                    (name, String::new())
                }
            }
        }
        None => {
            out.report(ParseIssue::MissingHeader {
                block: index,
                header: TAG_HEADER,
            });
            (String::new(), String::new())
        }
    };

    VlanRecord { name, tag, subnet }
}

/// Text following the first line that ends with `header`.
fn section_after<'a>(block: &'a str, header: &str) -> Option<&'a str> {
    let mut offset = 0;
    for line in block.split_inclusive('\n') {
        offset += line.len();
        if line.trim_end().ends_with(header) {
            return block.get(offset..);
        }
    }
    None
}

/// `first last gateway mask` → the network containing `first`, host bits
/// cleared.
fn parse_subnet(block: usize, line: &str) -> Result<Ipv4Network, ParseIssue> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let [first, _last, _gateway, mask] = tokens.as_slice() else {
        return Err(ParseIssue::SubnetTokens {
            block,
            found: tokens.len(),
        });
    };

    let address: Ipv4Addr = first.parse().map_err(|_| ParseIssue::InvalidAddress {
        block,
        value: (*first).to_owned(),
    })?;
    let invalid_mask = || ParseIssue::InvalidMask {
        block,
        value: (*mask).to_owned(),
    };
    let prefix = parse_mask(mask).ok_or_else(invalid_mask)?;

    let host = Ipv4Network::new(address, prefix).map_err(|_| invalid_mask())?;
    Ipv4Network::new(host.network(), prefix).map_err(|_| invalid_mask())
}

/// Dotted netmask (`255.255.255.0`), hostmask (`0.0.0.255`) or bare
/// prefix length (`24`).
fn parse_mask(mask: &str) -> Option<u8> {
    if mask.contains('.') {
        let dotted: Ipv4Addr = mask.parse().ok()?;
        ipv4_mask_to_prefix(dotted)
            .or_else(|_| ipv4_mask_to_prefix(Ipv4Addr::from(!u32::from(dotted))))
            .ok()
    } else {
        mask.parse::<u8>().ok().filter(|prefix| *prefix <= 32)
    }
}
