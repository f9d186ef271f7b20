//! Simulated Maqueen expansion board.
//!
//! Answers the register protocol like the real board: a one-byte write
//! selects a register, a longer write stores a payload, and a read returns
//! bytes starting at the selected register. The line and IR registers replay
//! a fixed script so the event poller has something to react to.

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use mqn_core::utils::controllers::registers as reg;
use tracing::{debug, info};

const FIRMWARE: &[u8] = b"SIM-1.0";

/// Line register samples, one per poll. Bit 0 = left, bit 1 = right.
const LINE_TRACK: [u8; 12] = [
    0b00, 0b00, 0b01, 0b01, 0b00, 0b00, 0b10, 0b10, 0b00, 0b11, 0b11, 0b00,
];

/// IR register samples (big-endian), one per poll. Zero means no key.
const IR_SCRIPT: [u32; 16] = [
    0, 0, 0xFD807F, 0xFD807F, 0, 0, 0, 0xFD8877, 0, 0, 0x123456, 0, 0, 0, 0, 0xFD00FF,
];

pub struct SimBoard {
    address: u8,
    regs: [u8; 256],
    pointer: u8,
    line_step: usize,
    ir_step: usize,
}

impl SimBoard {
    pub fn new(address: u8) -> Self {
        let mut regs = [0u8; 256];
        regs[reg::VERSION_LEN as usize] = FIRMWARE.len() as u8;
        let start = reg::VERSION_DATA as usize;
        regs[start..start + FIRMWARE.len()].copy_from_slice(FIRMWARE);
        // Echo of 123 cm.
        regs[reg::ULTRASONIC as usize..][..2].copy_from_slice(&123u16.to_be_bytes());

        SimBoard {
            address,
            regs,
            pointer: 0,
            line_step: 0,
            ir_step: 0,
        }
    }

    fn store(
        &mut self,
        bytes: &[u8],
    ) {
        let Some((&register, payload)) = bytes.split_first() else {
            return;
        };
        self.pointer = register;
        if payload.is_empty() {
            return;
        }
        let start = register as usize;
        let end = (start + payload.len()).min(self.regs.len());
        self.regs[start..end].copy_from_slice(&payload[..end - start]);
        info!("board <- reg 0x{:02X} {:?}", register, payload);
    }

    /// Advance the scripted sensors when their register is read.
    fn refresh(&mut self) {
        match self.pointer {
            reg::PATROL => {
                self.regs[reg::PATROL as usize] = LINE_TRACK[self.line_step % LINE_TRACK.len()];
                self.line_step += 1;
            }
            reg::IR_CODE => {
                let code = IR_SCRIPT.get(self.ir_step).copied().unwrap_or(0);
                let start = reg::IR_CODE as usize;
                self.regs[start..start + 4].copy_from_slice(&code.to_be_bytes());
                self.ir_step += 1;
            }
            _ => {}
        }
    }

    fn load(
        &mut self,
        buf: &mut [u8],
    ) {
        self.refresh();
        for (i, b) in buf.iter_mut().enumerate() {
            *b = self.regs[(self.pointer as usize + i) % self.regs.len()];
        }
        debug!("board -> reg 0x{:02X} {:?}", self.pointer, buf);
    }
}

impl ErrorType for SimBoard {
    type Error = ErrorKind;
}

impl I2c for SimBoard {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => self.store(bytes),
                Operation::Read(buf) => self.load(buf),
            }
        }
        Ok(())
    }
}
