use {
    crate::{
        wire_xcon::{
            shape::ShapeNotify,
            xproto::{
                GetInputFocus, GetInputFocusReply, ProtocolError, QueryExtension,
                QueryExtensionReply, Setup,
            },
        },
        xcon::{
            Formatter, Message, Parser, Request, Xcon, XconError,
            consts::{SETUP_AUTHENTICATE, SETUP_FAILED},
            registry::Registry,
            transport::Transport,
        },
    },
    std::{cell::RefCell, collections::VecDeque, rc::Rc},
};

pub(crate) const SHAPE_OPCODE: u8 = 130;
pub(crate) const SHAPE_FIRST_EVENT: u8 = 70;

pub(crate) struct RecordedRequest {
    pub(crate) serial: u64,
    pub(crate) major: u8,
    pub(crate) minor: u8,
    pub(crate) body: Vec<u8>,
}

type Responder = Box<dyn FnMut(&RecordedRequest) -> Vec<Vec<u8>>>;

/// A scripted X server that answers requests as soon as they are written.
pub(crate) struct MockServer {
    pub(crate) input: VecDeque<u8>,
    pending: Vec<u8>,
    pub(crate) setup_request: Option<Vec<u8>>,
    pub(crate) setup_status: u8,
    pub(crate) setup: Setup,
    pub(crate) shape_present: bool,
    serial: u64,
    pub(crate) requests: Vec<RecordedRequest>,
    responder: Responder,
    pub(crate) shutdown: bool,
}

fn no_response(_: &RecordedRequest) -> Vec<Vec<u8>> {
    vec![]
}

struct MockTransport(Rc<RefCell<MockServer>>);

impl MockServer {
    pub(crate) fn new() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            input: Default::default(),
            pending: vec![],
            setup_request: None,
            setup_status: 1,
            setup: Setup {
                protocol_major_version: 11,
                protocol_minor_version: 0,
                resource_id_base: 0x400000,
                resource_id_mask: 0x1fffff,
                maximum_request_length: u16::MAX,
                vendor: "mock".into(),
                ..Default::default()
            },
            shape_present: true,
            serial: 0,
            requests: vec![],
            responder: Box::new(no_response),
            shutdown: false,
        }))
    }

    fn handle_setup_request(&mut self) -> bool {
        if self.pending.len() < 12 {
            return false;
        }
        let name_len = u16::from_ne_bytes([self.pending[6], self.pending[7]]) as usize;
        let data_len = u16::from_ne_bytes([self.pending[8], self.pending[9]]) as usize;
        let len = 12 + name_len.next_multiple_of(4) + data_len.next_multiple_of(4);
        if self.pending.len() < len {
            return false;
        }
        self.setup_request = Some(self.pending.drain(..len).collect());
        let mut buf = vec![];
        let mut formatter = Formatter::new(&mut buf);
        match self.setup_status {
            SETUP_FAILED => {
                let reason = b"go away";
                formatter.write_packed(&SETUP_FAILED);
                formatter.write_packed(&(reason.len() as u8));
                formatter.write_packed(&11u16);
                formatter.write_packed(&0u16);
                formatter.write_packed(&2u16);
                formatter.write_bytes(reason);
                formatter.align(4);
            }
            SETUP_AUTHENTICATE => {
                let reason = b"cookie";
                formatter.write_packed(&SETUP_AUTHENTICATE);
                formatter.pad(5);
                formatter.write_packed(&2u16);
                formatter.write_bytes(reason);
                formatter.align(4);
            }
            status => {
                self.setup.serialize(&mut formatter);
                buf[0] = status;
            }
        }
        self.input.extend(buf);
        true
    }

    fn handle_request(&mut self, request: RecordedRequest) {
        let responses = match request.major {
            QueryExtension::OPCODE => {
                let mut parser = Parser::new(&request.body);
                let query = QueryExtension::deserialize(&mut parser).unwrap();
                let present = query.name == "SHAPE" && self.shape_present;
                let msg = QueryExtensionReply {
                    present: present as u8,
                    major_opcode: if present { SHAPE_OPCODE } else { 0 },
                    first_event: if present { SHAPE_FIRST_EVENT } else { 0 },
                    first_error: 0,
                };
                vec![reply(request.serial, &msg)]
            }
            GetInputFocus::OPCODE => {
                let msg = GetInputFocusReply {
                    revert_to: 1,
                    focus: 1,
                };
                vec![reply(request.serial, &msg)]
            }
            _ => (self.responder)(&request),
        };
        for response in responses {
            self.input.extend(response);
        }
        self.requests.push(request);
    }
}

impl Transport for MockTransport {
    fn write_all(&mut self, buf: &[u8]) -> Result<(), XconError> {
        let mut server = self.0.borrow_mut();
        let server = &mut *server;
        server.pending.extend_from_slice(buf);
        if server.setup_request.is_none() && !server.handle_setup_request() {
            return Ok(());
        }
        while server.pending.len() >= 4 {
            let len = u16::from_ne_bytes([server.pending[2], server.pending[3]]) as usize * 4;
            assert!(len >= 4);
            if server.pending.len() < len {
                break;
            }
            let req: Vec<u8> = server.pending.drain(..len).collect();
            server.serial += 1;
            let request = RecordedRequest {
                serial: server.serial,
                major: req[0],
                minor: req[1],
                body: req[4..].to_vec(),
            };
            server.handle_request(request);
        }
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), XconError> {
        let mut server = self.0.borrow_mut();
        let server = &mut *server;
        if server.input.len() < buf.len() {
            return Err(XconError::Closed);
        }
        for b in buf {
            *b = server.input.pop_front().unwrap();
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        self.0.borrow_mut().shutdown = true;
    }
}

fn header(buf: &mut [u8], response_type: u8, serial: u64) {
    buf[0] = response_type;
    buf[2..4].copy_from_slice(&(serial as u16).to_ne_bytes());
}

pub(crate) fn reply<M: Message>(serial: u64, msg: &M) -> Vec<u8> {
    let mut buf = vec![];
    msg.serialize(&mut Formatter::new(&mut buf));
    assert!(buf.len() >= 32);
    header(&mut buf, 1, serial);
    let length = ((buf.len() - 32) / 4) as u32;
    buf[4..8].copy_from_slice(&length.to_ne_bytes());
    buf
}

pub(crate) fn error(serial: u64, code: u8, request: &RecordedRequest, bad_value: u32) -> Vec<u8> {
    let mut buf = vec![];
    let msg = ProtocolError {
        error_code: code,
        bad_value,
        minor_opcode: request.minor as u16,
        major_opcode: request.major,
    };
    msg.serialize(&mut Formatter::new(&mut buf));
    header(&mut buf, 0, serial);
    buf
}

pub(crate) fn notify(serial: u64, response_type: u8, window: u32) -> Vec<u8> {
    let mut buf = vec![];
    let msg = ShapeNotify {
        shape_kind: 2,
        affected_window: window,
        extents_x: -1,
        extents_y: 2,
        extents_width: 100,
        extents_height: 200,
        server_time: 999,
        shaped: 1,
    };
    msg.serialize(&mut Formatter::new(&mut buf));
    header(&mut buf, response_type, serial);
    buf
}

pub(crate) fn respond<F>(server: &Rc<RefCell<MockServer>>, f: F)
where
    F: FnMut(&RecordedRequest) -> Vec<Vec<u8>> + 'static,
{
    server.borrow_mut().responder = Box::new(f);
}

pub(crate) fn connect(server: &Rc<RefCell<MockServer>>) -> Result<Xcon, XconError> {
    let registry = Registry::with_default_extensions().unwrap();
    Xcon::connect_to_transport(
        Box::new(MockTransport(server.clone())),
        &registry,
        b"MIT-MAGIC-COOKIE-1",
        b"0123456789abcdef",
    )
}

pub(crate) fn round_trip(xcon: &Xcon) {
    xcon.call(&GetInputFocus {}).reply().unwrap();
}
