//! Packet exchange: session guard, inbound dispatch, outbound encoding.
//!
//! A STATUS send may be answered by a PING, whose PONG may be answered by
//! another PING, and so on.  [`NodeService::exchange`] is the only way a
//! packet leaves the node and bounds that chain by nesting depth.
//!
//! ```text
//!  exchange(STATUS) ─▶ transmit ─▶ data_ready? ─▶ handle_packet
//!        ▲                                             │ PING
//!        └──────────────── exchange(PONG) ◀────────────┘
//! ```
//!
//! Protocol errors never propagate as return values; they are latched into
//! the cycle's error mask and surface in the next STATUS report.

use log::{debug, error, trace, warn};

use crate::error::ErrorFlag;
use crate::proto::codec::{HEADER_SIZE, Header, Record, RecordError, Records};
use crate::proto::status::StatusBit;
use crate::proto::{Command, Frame, MAX_PAYLOAD};

use super::ports::{NodeHardware, SendStatus};
use super::service::NodeService;

impl NodeService<'_> {
    /// Send one packet and process at most one reply, recursively.
    ///
    /// Depth is restored on every exit path.  Past the configured depth
    /// the send is suppressed and [`ErrorFlag::CommDepth`] is latched.
    pub fn exchange(&mut self, hw: &mut impl NodeHardware, cmd: Command, data: &[u8]) {
        if self.ctx.session_depth >= self.ctx.config.max_session_depth {
            warn!(
                "Reply chain already {} deep (max {}); dropping {:?}",
                self.ctx.session_depth, self.ctx.config.max_session_depth, cmd
            );
            self.ctx.errors.set(ErrorFlag::CommDepth);
            return;
        }
        self.ctx.session_depth += 1;

        self.send_packet(hw, cmd, data);

        if hw.data_ready() {
            let mut packet = [0u8; MAX_PAYLOAD];
            let len = hw.receive(&mut packet);
            if len > 0 && len <= MAX_PAYLOAD {
                self.handle_packet(hw, &packet[..len]);
            }
        }

        self.ctx.session_depth -= 1;
    }

    /// Decode one controller-to-device packet and dispatch its commands.
    pub fn handle_packet(&mut self, hw: &mut impl NodeHardware, pkt: &[u8]) {
        let Some(header) = Header::parse(pkt) else {
            trace!("Ignoring {}-byte fragment", pkt.len());
            return;
        };

        if !header.addressed_to(self.ctx.config.device_id) {
            trace!("Ignoring packet for device {}", header.device_id);
            return;
        }

        if header.version != self.ctx.config.protocol_version {
            self.ctx.errors.set(ErrorFlag::ProtoVersion);
            return;
        }

        if !self.ctx.counters.accept_inbound(header.counter) {
            self.ctx.errors.set(ErrorFlag::WrongCounter);
        }

        for record in Records::new(pkt) {
            match record {
                Ok(Record::Nop) => {}
                Ok(Record::Ping(id)) => {
                    debug!("PING {:#04x}", id);
                    self.exchange(hw, Command::Pong, &[id]);
                }
                Ok(Record::Pong(_)) => self.ctx.errors.set(ErrorFlag::UnexpectedCommand),
                Ok(Record::Reset(cycles)) => self.supervisor.set_countdown(cycles),
                Err(RecordError::Unknown(op)) => {
                    debug!("Unknown opcode {:#04x}; rest of packet dropped", op);
                    self.ctx.errors.set(ErrorFlag::UnknownCommand);
                    return;
                }
                Err(RecordError::Truncated(cmd)) => {
                    warn!("{:?} operand missing; rest of packet dropped", cmd);
                    return;
                }
            }
        }
    }

    /// Serialize one device-to-controller packet.
    ///
    /// Only STATUS and PONG are ever sent.  A payload that would exceed
    /// [`MAX_PAYLOAD`] is checked first, then the command kind; either
    /// latches an internal error and returns `None` with the outbound
    /// counter untouched.
    pub fn encode_packet(&mut self, cmd: Command, data: &[u8]) -> Option<Frame> {
        if HEADER_SIZE + 1 + data.len() > MAX_PAYLOAD {
            error!("{:?} payload of {} bytes exceeds ceiling", cmd, data.len());
            self.ctx.errors.set(ErrorFlag::EncodeOversize);
            return None;
        }

        let status = match cmd {
            Command::Status => {
                // Errors from the previous cycle are reported once more.
                if self.ctx.errors.any() != 0 {
                    self.ctx.status.set(StatusBit::Error, true);
                }
                Some(self.status_report())
            }
            Command::Pong => None,
            other => {
                error!("Refusing to encode {:?}", other);
                self.ctx.errors.set(ErrorFlag::EncodeUnsupported);
                return None;
            }
        };

        let total = HEADER_SIZE + 1 + status.map_or(data.len(), |r| r.encoded_len());
        let mut frame = Frame::new();
        if frame.resize_default(total).is_err() {
            error!("{:?} frame of {} bytes exceeds ceiling", cmd, total);
            self.ctx.errors.set(ErrorFlag::EncodeOversize);
            return None;
        }

        let header = Header {
            version: self.ctx.config.protocol_version,
            device_id: self.ctx.config.device_id,
            counter: self.ctx.counters.next_outbound(),
        };
        let mut len = header.write(&mut frame);
        frame[len] = cmd.opcode();
        len += 1;

        match status {
            Some(report) => {
                report.write(&mut frame[len..]);
            }
            None => frame[len..].copy_from_slice(data),
        }
        Some(frame)
    }

    /// Encode and transmit.  Returns `true` if the radio confirmed delivery.
    fn send_packet(&mut self, hw: &mut impl NodeHardware, cmd: Command, data: &[u8]) -> bool {
        let Some(frame) = self.encode_packet(cmd, data) else {
            return false;
        };

        match self.power.transmit(hw, self.irq, &frame) {
            SendStatus::Delivered => true,
            _ => {
                self.ctx.errors.set(ErrorFlag::CantDeliver);
                false
            }
        }
    }
}
