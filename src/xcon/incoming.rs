use {
    crate::{
        utils::errorfmt::ErrorFmt,
        wire_xcon::xproto::ProtocolError,
        xcon::{
            Event, EventOrigin, ExtensionData, ExtensionIdRange, Message, Parser, ReplyHandler,
            XconData, XconError,
            consts::{
                FIRST_EXTENSION_ERROR, FIRST_EXTENSION_EVENT, KEYMAP_NOTIFY, MAX_LENGTH_UNITS,
                MIN_MSG_SIZE, RESPONSE_ERROR, RESPONSE_REPLY, RESPONSE_SEND_EVENT_MASK,
                XGE_EVENT,
            },
        },
    },
};

/// Reads and routes one message from the server.
pub(super) fn handle_msg(socket: &XconData) -> Result<(), XconError> {
    let mut msg_buf = vec![0; MIN_MSG_SIZE];
    socket.transport.borrow_mut().read_exact(&mut msg_buf)?;
    let response_type = msg_buf[0] & !RESPONSE_SEND_EVENT_MASK;
    let mut serial = 0;
    if response_type != KEYMAP_NOTIFY {
        let serial_16 = u16::from_ne_bytes([msg_buf[2], msg_buf[3]]);
        serial = (socket.last_recv_serial.get() & !0xffff) | (serial_16 as u64);
        if serial < socket.last_recv_serial.get() {
            serial += 0x10000;
        }
        socket.last_recv_serial.set(serial);
        while let Some(handler) = take_handler(socket, |s| s < serial) {
            handler.handle_noreply()?;
        }
    }
    if matches!(response_type, RESPONSE_REPLY | XGE_EVENT) {
        let length =
            u32::from_ne_bytes([msg_buf[4], msg_buf[5], msg_buf[6], msg_buf[7]]) as usize;
        if length > MAX_LENGTH_UNITS {
            return Err(XconError::ExcessiveMessageSize);
        }
        msg_buf.resize(MIN_MSG_SIZE + length * 4, 0);
        socket
            .transport
            .borrow_mut()
            .read_exact(&mut msg_buf[MIN_MSG_SIZE..])?;
    }
    let ed = socket.extensions.borrow().clone();
    match response_type {
        RESPONSE_ERROR => handle_error(socket, &ed, serial, &msg_buf),
        RESPONSE_REPLY => handle_reply(socket, serial, &msg_buf),
        _ => {
            handle_event(socket, &ed, serial, msg_buf);
            Ok(())
        }
    }
}

fn take_handler(
    socket: &XconData,
    matches: impl Fn(u64) -> bool,
) -> Option<Box<dyn ReplyHandler>> {
    let mut handlers = socket.reply_handlers.borrow_mut();
    match handlers.front() {
        Some(first) if matches(first.serial()) => handlers.pop_front(),
        _ => None,
    }
}

fn handle_error(
    socket: &XconData,
    ed: &ExtensionData,
    serial: u64,
    msg_buf: &[u8],
) -> Result<(), XconError> {
    let mut error = ProtocolError::deserialize(&mut Parser::new(msg_buf))?;
    let code = error.error_code;
    let e = if code < FIRST_EXTENSION_ERROR {
        XconError::CoreError(error)
    } else if let Some(r) = find_range(&ed.errors, code) {
        error.error_code = code - r.first;
        XconError::ExtensionError(r.extension, error)
    } else {
        log::warn!("Received an out of bounds error code {}", code);
        XconError::UnknownError(error)
    };
    if let Some(handler) = take_handler(socket, |s| s == serial) {
        handler.handle_error(e);
        return Ok(());
    }
    log::warn!(
        "Received an error with no corresponding handler: {}",
        ErrorFmt(&e)
    );
    socket.errors.borrow_mut().push_back(e);
    Ok(())
}

fn handle_reply(socket: &XconData, serial: u64, msg_buf: &[u8]) -> Result<(), XconError> {
    match take_handler(socket, |s| s == serial) {
        Some(handler) => handler.handle_result(&mut Parser::new(msg_buf)),
        _ => {
            log::trace!("Discarding the reply to request {}", serial);
            Ok(())
        }
    }
}

fn handle_event(socket: &XconData, ed: &ExtensionData, serial: u64, msg_buf: Vec<u8>) {
    let ev = msg_buf[0] & !RESPONSE_SEND_EVENT_MASK;
    let (origin, code) = if ev == XGE_EVENT {
        let opcode = msg_buf[1];
        let code = u16::from_ne_bytes([msg_buf[8], msg_buf[9]]);
        match ed.ext_by_opcode.get(&opcode) {
            Some(ext) => (EventOrigin::Extension(*ext), code),
            _ => {
                log::warn!("Received an XGE event of an unknown extension {}", opcode);
                (EventOrigin::Unrecognized, code)
            }
        }
    } else if ev < FIRST_EXTENSION_EVENT {
        (EventOrigin::Core, ev as u16)
    } else if let Some(r) = find_range(&ed.events, ev) {
        (EventOrigin::Extension(r.extension), (ev - r.first) as u16)
    } else {
        log::warn!("Received an out of bounds event {}", ev);
        (EventOrigin::Unrecognized, ev as u16)
    };
    socket.events.borrow_mut().push_back(Event {
        origin,
        code,
        serial,
        buf: msg_buf,
    });
}

fn find_range(codes: &[ExtensionIdRange], code: u8) -> Option<&ExtensionIdRange> {
    let idx = match codes.binary_search_by_key(&code, |v| v.first) {
        Ok(v) => v,
        Err(v) if v > 0 => v - 1,
        _ => return None,
    };
    let range = &codes[idx];
    if (code - range.first) as u16 >= range.count {
        return None;
    }
    Some(range)
}
