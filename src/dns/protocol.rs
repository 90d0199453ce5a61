#![allow(clippy::upper_case_acronyms)]

use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::net::{Ipv4Addr, Ipv6Addr};
use strum_macros::Display;

use crate::io::packet_buffer::PacketBuffer;

use super::error::DnsError;

pub const CLASS_IN: u16 = 1;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Display, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u16)]
pub enum QueryType {
    A = 1,
    NS = 2,
    CNAME = 5,
    SOA = 6,
    PTR = 12,
    MX = 15,
    TXT = 16,
    AAAA = 28,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ResultCode {
    NOERROR = 0,
    FORMERR = 1,
    SERVFAIL = 2,
    NXDOMAIN = 3,
    NOTIMP = 4,
    REFUSED = 5,
    YXDOMAIN = 6,
    YXRRSET = 7,
    NXRRSET = 8,
    NOTAUTH = 9,
    NOTZONE = 10,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct DnsHeader {
    pub id: u16, // 16 bits

    pub recursion_desired: bool,    // 1 bit
    pub truncated_message: bool,    // 1 bit
    pub authoritative_answer: bool, // 1 bit
    pub opcode: u8,                 // 4 bits
    pub response: bool,             // 1 bit

    pub rescode: ResultCode,       // 4 bits
    pub checking_disabled: bool,   // 1 bit
    pub authed_data: bool,         // 1 bit
    pub z: bool,                   // 1 bit
    pub recursion_available: bool, // 1 bit

    pub questions: u16,             // 16 bits
    pub answers: u16,               // 16 bits
    pub authoritative_entries: u16, // 16 bits
    pub resource_entries: u16,      // 16 bits
}

impl DnsHeader {
    pub const fn new() -> Self {
        Self {
            id: 0,

            recursion_desired: false,
            truncated_message: false,
            authoritative_answer: false,
            opcode: 0,
            response: false,

            rescode: ResultCode::NOERROR,
            checking_disabled: false,
            authed_data: false,
            z: false,
            recursion_available: false,

            questions: 0,
            answers: 0,
            authoritative_entries: 0,
            resource_entries: 0,
        }
    }

    pub fn read(buffer: &mut PacketBuffer) -> Result<Self, DnsError> {
        let id = buffer.read_u16()?;

        let [a, b] = buffer.read_u16()?.to_be_bytes();
        let rescode = ResultCode::try_from(b & 0x0F)
            .map_err(|_| DnsError::ProtocolData(format!("Unknown response code {}", b & 0x0F)))?;

        Ok(Self {
            id,

            recursion_desired: (a & (1 << 0)) > 0,
            truncated_message: (a & (1 << 1)) > 0,
            authoritative_answer: (a & (1 << 2)) > 0,
            opcode: (a >> 3) & 0x0F,
            response: (a & (1 << 7)) > 0,

            rescode,
            checking_disabled: (b & (1 << 4)) > 0,
            authed_data: (b & (1 << 5)) > 0,
            z: (b & (1 << 6)) > 0,
            recursion_available: (b & (1 << 7)) > 0,

            questions: buffer.read_u16()?,
            answers: buffer.read_u16()?,
            authoritative_entries: buffer.read_u16()?,
            resource_entries: buffer.read_u16()?,
        })
    }

    pub fn write(&self, buffer: &mut PacketBuffer) -> Result<(), DnsError> {
        buffer.write_u16(self.id)?;

        buffer.write_u8(
            u8::from(self.recursion_desired)
                | (u8::from(self.truncated_message) << 1)
                | (u8::from(self.authoritative_answer) << 2)
                | ((self.opcode & 0x0F) << 3)
                | (u8::from(self.response) << 7),
        )?;

        buffer.write_u8(
            u8::from(self.rescode)
                | (u8::from(self.checking_disabled) << 4)
                | (u8::from(self.authed_data) << 5)
                | (u8::from(self.z) << 6)
                | (u8::from(self.recursion_available) << 7),
        )?;

        buffer.write_u16(self.questions)?;
        buffer.write_u16(self.answers)?;
        buffer.write_u16(self.authoritative_entries)?;
        buffer.write_u16(self.resource_entries)?;

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuestion {
    pub name: String,
    pub qtype: QueryType,
}

impl DnsQuestion {
    pub fn new(name: impl Into<String>, qtype: QueryType) -> Self {
        Self {
            name: name.into(),
            qtype,
        }
    }

    pub fn read(buffer: &mut PacketBuffer) -> Result<Self, DnsError> {
        let name = buffer.read_qname()?;
        let qtype_num = buffer.read_u16()?;
        let qtype = QueryType::try_from(qtype_num)
            .map_err(|_| DnsError::ProtocolData(format!("Unexpected question type {qtype_num}")))?;
        let _qclass = buffer.read_u16()?;

        Ok(Self { name, qtype })
    }

    pub fn write(&self, buffer: &mut PacketBuffer) -> Result<(), DnsError> {
        buffer.write_qname(&self.name)?;
        buffer.write_u16(self.qtype.into())?;
        buffer.write_u16(CLASS_IN)?;

        Ok(())
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum RData {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),
    NS(String),
    CNAME(String),
    PTR(String),
    MX {
        preference: u16,
        exchange: String,
    },
    TXT(String),
    SOA {
        mname: String,
        rname: String,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    },
    Unknown {
        qtype: u16,
        data: Vec<u8>,
    },
}

impl RData {
    pub fn qtype(&self) -> u16 {
        match self {
            Self::A(_) => QueryType::A.into(),
            Self::AAAA(_) => QueryType::AAAA.into(),
            Self::NS(_) => QueryType::NS.into(),
            Self::CNAME(_) => QueryType::CNAME.into(),
            Self::PTR(_) => QueryType::PTR.into(),
            Self::MX { .. } => QueryType::MX.into(),
            Self::TXT(_) => QueryType::TXT.into(),
            Self::SOA { .. } => QueryType::SOA.into(),
            Self::Unknown { qtype, .. } => *qtype,
        }
    }

    fn read(buffer: &mut PacketBuffer, qtype: u16, end: usize) -> Result<Self, DnsError> {
        let data_len = end - buffer.pos();

        let Ok(known) = QueryType::try_from(qtype) else {
            return Ok(Self::Unknown {
                qtype,
                data: buffer.read_bytes(data_len)?,
            });
        };

        let rdata = match known {
            QueryType::A => {
                let octets: [u8; 4] = buffer
                    .read_bytes(4)?
                    .try_into()
                    .map_err(|_| DnsError::ProtocolData("Malformed A record".to_owned()))?;
                Self::A(Ipv4Addr::from(octets))
            }
            QueryType::AAAA => {
                let octets: [u8; 16] = buffer
                    .read_bytes(16)?
                    .try_into()
                    .map_err(|_| DnsError::ProtocolData("Malformed AAAA record".to_owned()))?;
                Self::AAAA(Ipv6Addr::from(octets))
            }
            QueryType::NS => Self::NS(buffer.read_qname()?),
            QueryType::CNAME => Self::CNAME(buffer.read_qname()?),
            QueryType::PTR => Self::PTR(buffer.read_qname()?),
            QueryType::MX => Self::MX {
                preference: buffer.read_u16()?,
                exchange: buffer.read_qname()?,
            },
            QueryType::TXT => {
                let mut text = String::new();
                while buffer.pos() < end {
                    let len = buffer.read_u8()?;
                    let chunk = buffer.read_bytes(usize::from(len))?;
                    text.push_str(&String::from_utf8_lossy(&chunk));
                }
                Self::TXT(text)
            }
            QueryType::SOA => Self::SOA {
                mname: buffer.read_qname()?,
                rname: buffer.read_qname()?,
                serial: buffer.read_u32()?,
                refresh: buffer.read_u32()?,
                retry: buffer.read_u32()?,
                expire: buffer.read_u32()?,
                minimum: buffer.read_u32()?,
            },
        };

        Ok(rdata)
    }

    fn write(&self, buffer: &mut PacketBuffer) -> Result<(), DnsError> {
        match self {
            Self::A(addr) => buffer.write_bytes(&addr.octets())?,
            Self::AAAA(addr) => buffer.write_bytes(&addr.octets())?,
            Self::NS(name) | Self::CNAME(name) | Self::PTR(name) => buffer.write_qname(name)?,
            Self::MX {
                preference,
                exchange,
            } => {
                buffer.write_u16(*preference)?;
                buffer.write_qname(exchange)?;
            }
            Self::TXT(text) => {
                for chunk in text.as_bytes().chunks(usize::from(u8::MAX)) {
                    // chunks() never yields more than 255 bytes
                    buffer.write_u8(u8::try_from(chunk.len()).unwrap_or(u8::MAX))?;
                    buffer.write_bytes(chunk)?;
                }
            }
            Self::SOA {
                mname,
                rname,
                serial,
                refresh,
                retry,
                expire,
                minimum,
            } => {
                buffer.write_qname(mname)?;
                buffer.write_qname(rname)?;
                for value in [serial, refresh, retry, expire, minimum] {
                    buffer.write_u32(*value)?;
                }
            }
            Self::Unknown { data, .. } => buffer.write_bytes(data)?,
        }

        Ok(())
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ResourceRecord {
    pub name: String,
    pub class: u16,
    pub ttl: u32,
    pub data: RData,
}

impl ResourceRecord {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, ttl: u32, data: RData) -> Self {
        Self {
            name: name.into(),
            class: CLASS_IN,
            ttl,
            data,
        }
    }

    pub fn read(buffer: &mut PacketBuffer) -> Result<Self, DnsError> {
        let name = buffer.read_qname()?;
        let qtype = buffer.read_u16()?;
        let class = buffer.read_u16()?;
        let ttl = buffer.read_u32()?;
        let data_len = usize::from(buffer.read_u16()?);

        let end = buffer.pos() + data_len;
        let data = RData::read(buffer, qtype, end)?;

        if buffer.pos() > end {
            return Err(DnsError::ProtocolData(format!(
                "Record data for '{name}' overruns its declared length of {data_len}"
            )));
        }
        buffer.seek(end)?;

        Ok(Self {
            name,
            class,
            ttl,
            data,
        })
    }

    pub fn write(&self, buffer: &mut PacketBuffer) -> Result<(), DnsError> {
        buffer.write_qname(&self.name)?;
        buffer.write_u16(self.data.qtype())?;
        buffer.write_u16(self.class)?;
        buffer.write_u32(self.ttl)?;

        let len_pos = buffer.pos();
        buffer.write_u16(0)?;
        self.data.write(buffer)?;

        let data_len = u16::try_from(buffer.pos() - len_pos - 2)
            .map_err(|_| DnsError::InvalidData("Record data too long".to_owned()))?;
        buffer.set_u16(len_pos, data_len)?;

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DnsPacket {
    pub header: DnsHeader,
    pub questions: Vec<DnsQuestion>,
    pub answers: Vec<ResourceRecord>,
    pub authorities: Vec<ResourceRecord>,
    pub resources: Vec<ResourceRecord>,
}

impl DnsPacket {
    pub const fn new() -> Self {
        Self {
            header: DnsHeader::new(),
            questions: Vec::new(),
            answers: Vec::new(),
            authorities: Vec::new(),
            resources: Vec::new(),
        }
    }

    pub fn from_buffer(buffer: &mut PacketBuffer) -> Result<Self, DnsError> {
        let header = DnsHeader::read(buffer)
            .map_err(|e| DnsError::ProtocolData(format!("Failed to read DNS header: {e}")))?;

        let questions = (0..header.questions)
            .map(|_| DnsQuestion::read(buffer))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DnsError::ProtocolData(format!("Failed to read DNS question: {e}")))?;
        let answers = read_section(buffer, header.answers, "answer")?;
        let authorities = read_section(buffer, header.authoritative_entries, "authority")?;
        let resources = read_section(buffer, header.resource_entries, "additional")?;

        Ok(Self {
            header,
            questions,
            answers,
            authorities,
            resources,
        })
    }

    pub fn write(&mut self, buffer: &mut PacketBuffer) -> Result<(), DnsError> {
        self.header.questions = section_len(self.questions.len())?;
        self.header.answers = section_len(self.answers.len())?;
        self.header.authoritative_entries = section_len(self.authorities.len())?;
        self.header.resource_entries = section_len(self.resources.len())?;

        self.header.write(buffer)?;

        for question in &self.questions {
            question.write(buffer)?;
        }
        for record in self
            .answers
            .iter()
            .chain(&self.authorities)
            .chain(&self.resources)
        {
            record.write(buffer)?;
        }

        Ok(())
    }
}

fn read_section(
    buffer: &mut PacketBuffer,
    count: u16,
    section: &str,
) -> Result<Vec<ResourceRecord>, DnsError> {
    (0..count)
        .map(|_| ResourceRecord::read(buffer))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DnsError::ProtocolData(format!("Failed to read DNS {section} record: {e}")))
}

fn section_len(len: usize) -> Result<u16, DnsError> {
    u16::try_from(len).map_err(|_| DnsError::InvalidData(format!("Too many records: {len}")))
}
