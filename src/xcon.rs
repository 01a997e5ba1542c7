use {
    crate::{
        utils::{errorfmt::ErrorFmt, numcell::NumCell, oserror::OsError},
        wire_xcon::{
            Extension,
            xproto::{GetInputFocus, ProtocolError, QueryExtension, Setup},
        },
        xcon::{
            consts::{
                PROTOCOL_MAJOR_VERSION, PROTOCOL_MINOR_VERSION, RESPONSE_SEND_EVENT_MASK,
                SETUP_AUTHENTICATE, SETUP_FAILED, SETUP_SUCCESS,
            },
            incoming::handle_msg,
            registry::{Registry, RegistryError},
            transport::{SocketTransport, Transport},
            xauthority::{XAuthority, find_cookie},
        },
    },
    ahash::AHashMap,
    bstr::BString,
    std::{
        cell::{Cell, RefCell},
        collections::VecDeque,
        mem::{self, MaybeUninit},
        ops::Deref,
        rc::{Rc, Weak},
    },
    thiserror::Error,
};

pub mod consts;
mod formatter;
mod incoming;
mod list;
mod parser;
pub mod registry;
pub mod transport;
mod wire_type;
pub mod xauthority;

pub use {
    formatter::{Formatter, MAX_REQUEST_SIZE},
    list::List,
    parser::Parser,
    wire_type::{FixedSize, Message, Request, XEvent},
};

#[derive(Debug, Error)]
pub enum XconError {
    #[error("Unexpected EOF")]
    UnexpectedEof,
    #[error("The message contains {0} unexpected trailing bytes")]
    TrailingBytes(usize),
    #[error("Neither XAUTHORITY nor HOME is set")]
    HomeNotSet,
    #[error("Could not read Xauthority file")]
    ReadXAuthority(#[source] std::io::Error),
    #[error("Display field in Xauthority could not be parsed")]
    InvalidAuthorityDisplay,
    #[error("The DISPLAY is not set")]
    DisplayNotSet,
    #[error("DISPLAY contains an invalid value")]
    InvalidDisplayFormat,
    #[error("Could not create a unix socket")]
    CreateSocket(#[source] OsError),
    #[error("Could not connect to Xserver")]
    ConnectSocket(#[source] OsError),
    #[error("Could not retrive the hostname")]
    Hostname(#[source] OsError),
    #[error("Could not read from the socket")]
    Read(#[source] OsError),
    #[error("Could not write to the socket")]
    Write(#[source] OsError),
    #[error("The server closed the connection")]
    Closed,
    #[error("Server rejected our connection attempt: {0}")]
    Connect(BString),
    #[error("Server requires additional authentication: {0}")]
    Authenticate(BString),
    #[error("The server answered the connection setup with unknown status {0}")]
    UnknownSetupStatus(u8),
    #[error("The server assigned invalid resource ids (base {base:#x}, mask {mask:#x})")]
    InvalidResourceIds { base: u32, mask: u32 },
    #[error("The server did not send a reply to a request")]
    MissingReply,
    #[error("The server sent a message with an excessive size")]
    ExcessiveMessageSize,
    #[error("The request has a size of {0} bytes which exceeds the maximum request size")]
    ExcessiveRequestSize(usize),
    #[error(transparent)]
    XconError(Rc<XconError>),
    #[error("The server does not support the `{0}` extension")]
    ExtensionUnavailable(&'static str),
    #[error("The server returned error {0}")]
    CoreError(ProtocolError),
    #[error("The extension `{}` returned error {}", .0, .1.error_code)]
    ExtensionError(Extension, ProtocolError),
    #[error("The server returned error {} of an unknown extension", .0.error_code)]
    UnknownError(ProtocolError),
    #[error("The connection to the server has already been closed")]
    Dead,
    #[error("Could not query the `{0}` extension")]
    QueryExtension(&'static str, #[source] Box<XconError>),
    #[error("All available xids have been used")]
    XidExhausted,
    #[error("Enum contains an unknown variant")]
    UnknownEnumVariant,
    #[error("Received an event with unrecognized code {0}")]
    UnrecognizedEvent(u8),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// The codes the server assigned to an extension.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ExtensionCodes {
    pub major_opcode: u8,
    pub first_event: u8,
    pub first_error: u8,
}

#[derive(Debug)]
struct ExtensionIdRange {
    extension: Extension,
    first: u8,
    count: u16,
}

#[derive(Default, Debug)]
pub struct ExtensionData {
    codes: AHashMap<Extension, ExtensionCodes>,
    ext_by_opcode: AHashMap<u8, Extension>,
    events: Vec<ExtensionIdRange>,
    errors: Vec<ExtensionIdRange>,
}

impl ExtensionData {
    pub fn codes(&self, extension: Extension) -> Option<ExtensionCodes> {
        self.codes.get(&extension).copied()
    }

    pub fn major_opcode(&self, extension: Extension) -> Option<u8> {
        self.codes.get(&extension).map(|c| c.major_opcode)
    }

    pub fn is_present(&self, extension: Extension) -> bool {
        self.codes.contains_key(&extension)
    }
}

pub struct Xcon {
    data: Rc<XconData>,
    setup: Setup,
    extensions: Rc<ExtensionData>,

    xid_next: Cell<u32>,
    xid_inc: u32,
    xid_max: u32,
}

struct XconData {
    transport: RefCell<Box<dyn Transport>>,
    outgoing: RefCell<Vec<u8>>,
    next_serial: NumCell<u64>,
    last_recv_serial: Cell<u64>,
    reply_handlers: RefCell<VecDeque<Box<dyn ReplyHandler>>>,
    dead: Cell<bool>,
    need_sync: Cell<bool>,
    extensions: RefCell<Rc<ExtensionData>>,
    events: RefCell<VecDeque<Event>>,
    errors: RefCell<VecDeque<XconError>>,
}

/// A decoded reply together with the serial of its request.
pub struct Reply<T> {
    serial: u64,
    t: T,
}

impl<T> Reply<T> {
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn get(&self) -> &T {
        &self.t
    }

    pub fn into_inner(self) -> T {
        self.t
    }
}

impl<T> Deref for Reply<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.t
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EventOrigin {
    Core,
    Extension(Extension),
    /// The code does not belong to the core protocol or to a registered extension.
    Unrecognized,
}

/// An event as it was read from the wire.
pub struct Event {
    origin: EventOrigin,
    code: u16,
    serial: u64,
    buf: Vec<u8>,
}

impl Deref for Event {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.buf
    }
}

impl Event {
    pub fn origin(&self) -> EventOrigin {
        self.origin
    }

    pub fn ext(&self) -> Option<Extension> {
        match self.origin {
            EventOrigin::Extension(e) => Some(e),
            _ => None,
        }
    }

    /// The code of the event relative to the first event of its extension.
    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn response_type(&self) -> u8 {
        self.buf[0] & !RESPONSE_SEND_EVENT_MASK
    }

    pub fn sent_event(&self) -> bool {
        self.buf[0] & RESPONSE_SEND_EVENT_MASK != 0
    }

    pub fn parse<M: Message>(&self) -> Result<M, XconError> {
        let mut parser = Parser::new(&self.buf);
        let msg = M::deserialize(&mut parser)?;
        parser.finish()?;
        Ok(msg)
    }
}

trait ReplyHandler {
    fn serial(&self) -> u64;
    fn handle_result(self: Box<Self>, parser: &mut Parser<'_>) -> Result<(), XconError>;
    fn handle_noreply(self: Box<Self>) -> Result<(), XconError>;
    fn handle_error(self: Box<Self>, error: XconError);
}

struct ReplySlot<T> {
    data: Cell<Option<Result<Reply<T>, XconError>>>,
}

struct SlotReplyHandler<T> {
    serial: u64,
    is_void: bool,
    slot: Weak<ReplySlot<T>>,
}

impl<T> SlotReplyHandler<T> {
    fn done(self: Box<Self>, res: Result<Reply<T>, XconError>) {
        if let Some(slot) = self.slot.upgrade() {
            slot.data.set(Some(res));
        }
    }
}

impl<T: Message> ReplyHandler for SlotReplyHandler<T> {
    fn serial(&self) -> u64 {
        self.serial
    }

    fn handle_result(self: Box<Self>, parser: &mut Parser<'_>) -> Result<(), XconError> {
        let msg = T::deserialize(parser).and_then(|msg| parser.finish().map(|_| msg));
        let msg = match msg {
            Ok(m) => m,
            Err(e) => {
                let e = Rc::new(e);
                self.done(Err(XconError::XconError(e.clone())));
                return Err(XconError::XconError(e));
            }
        };
        let serial = self.serial;
        self.done(Ok(Reply { serial, t: msg }));
        Ok(())
    }

    fn handle_noreply(self: Box<Self>) -> Result<(), XconError> {
        if self.is_void {
            let t = T::deserialize(&mut Parser::new(&[]))?;
            let serial = self.serial;
            self.done(Ok(Reply { serial, t }));
            Ok(())
        } else {
            self.done(Err(XconError::MissingReply));
            Err(XconError::MissingReply)
        }
    }

    fn handle_error(self: Box<Self>, error: XconError) {
        self.done(Err(error))
    }
}

pub enum CookieState<T> {
    Pending(Cookie<T>),
    Ready(Reply<T>),
    Failed(XconError),
}

/// The pending result of a request.
///
/// Resolving a cookie consumes it.
pub struct Cookie<T> {
    serial: u64,
    slot: Rc<ReplySlot<T>>,
    data: Rc<XconData>,
}

impl<T: Message> Cookie<T> {
    fn failed(data: &Rc<XconData>, error: XconError) -> Self {
        Self {
            serial: 0,
            slot: Rc::new(ReplySlot {
                data: Cell::new(Some(Err(error))),
            }),
            data: data.clone(),
        }
    }

    /// The serial of the request or 0 if the request was never sent.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Returns the result if it has already been received.
    ///
    /// This function does not read from the connection.
    pub fn poll(self) -> CookieState<T> {
        match self.slot.data.take() {
            Some(Ok(r)) => CookieState::Ready(r),
            Some(Err(e)) => CookieState::Failed(e),
            None => CookieState::Pending(self),
        }
    }

    /// Blocks until the result has been received.
    pub fn reply(self) -> Result<Reply<T>, XconError> {
        loop {
            if let Some(res) = self.slot.data.take() {
                return res;
            }
            if self.data.dead.get() {
                return Err(XconError::Dead);
            }
            self.data.send_sync();
            if let Err(e) = self.data.dispatch() {
                log::error!("Could not process an incoming message: {}", ErrorFmt(e));
                self.data.kill();
            }
        }
    }
}

impl Xcon {
    pub fn setup(&self) -> &Setup {
        &self.setup
    }

    /// The codes the server assigned to the registered extensions.
    pub fn extensions(&self) -> &ExtensionData {
        &self.extensions
    }

    pub fn generate_id(&self) -> Result<u32, XconError> {
        if self.xid_next.get() == self.xid_max {
            return Err(XconError::XidExhausted);
        }
        let id = self.xid_next.get();
        self.xid_next.set(id + self.xid_inc);
        Ok(id)
    }

    /// Connects to the display named by the `DISPLAY` environment variable.
    pub fn connect(registry: &Registry) -> Result<Self, XconError> {
        let display = match std::env::var("DISPLAY") {
            Ok(d) => d,
            _ => return Err(XconError::DisplayNotSet),
        };
        Self::connect_to_display(parse_display(&display)?, registry)
    }

    pub fn connect_to_display(display: u32, registry: &Registry) -> Result<Self, XconError> {
        let authority = match XAuthority::load() {
            Ok(a) => a,
            Err(e) => {
                log::warn!(
                    "Could not parse Xauthority file. Proceeding without authorization: {}",
                    ErrorFmt(e)
                );
                vec![]
            }
        };
        let mut hnbuf = [MaybeUninit::<u8>::uninit(); 256];
        let hn = match uapi::gethostname(&mut hnbuf[..]) {
            Ok(hn) => hn.to_bytes(),
            Err(e) => return Err(XconError::Hostname(e.into())),
        };
        let transport = SocketTransport::connect(display)?;
        let (auth_method, auth_value) = match find_cookie(&authority, display, hn) {
            Some(auth) => (&auth.method[..], &auth.value[..]),
            _ => (&[][..], &[][..]),
        };
        Self::connect_to_transport(Box::new(transport), registry, auth_method, auth_value)
    }

    /// Performs the handshake on `transport` and queries the registered extensions.
    pub fn connect_to_transport(
        mut transport: Box<dyn Transport>,
        registry: &Registry,
        auth_method: &[u8],
        auth_value: &[u8],
    ) -> Result<Self, XconError> {
        let mut buf = vec![];
        {
            let mut formatter = Formatter::new(&mut buf);
            #[cfg(target_endian = "little")]
            const ENDIAN: u8 = b'l';
            #[cfg(target_endian = "big")]
            const ENDIAN: u8 = b'B';
            formatter.write_packed(&ENDIAN);
            formatter.pad(1);
            formatter.write_packed(&PROTOCOL_MAJOR_VERSION);
            formatter.write_packed(&PROTOCOL_MINOR_VERSION);
            formatter.write_packed(&(auth_method.len() as u16));
            formatter.write_packed(&(auth_value.len() as u16));
            formatter.pad(2);
            formatter.write_bytes(auth_method);
            formatter.align(4);
            formatter.write_bytes(auth_value);
            formatter.align(4);
        }
        transport.write_all(&buf)?;
        let mut buf = vec![0; 8];
        transport.read_exact(&mut buf)?;
        let len = u16::from_ne_bytes([buf[6], buf[7]]) as usize * 4;
        buf.resize(8 + len, 0);
        transport.read_exact(&mut buf[8..])?;
        let mut parser = Parser::new(&buf);
        match buf[0] {
            SETUP_FAILED => {
                parser.pad(1)?;
                let reason_len: u8 = parser.read_pod()?;
                parser.pad(6)?;
                let reason = parser.read_string(reason_len as usize)?;
                return Err(XconError::Connect(reason.to_owned()));
            }
            SETUP_AUTHENTICATE => {
                parser.pad(6)?;
                let reason_len: u16 = parser.read_pod()?;
                let reason = parser.read_string(reason_len as usize * 4)?;
                return Err(XconError::Authenticate(reason.to_owned()));
            }
            SETUP_SUCCESS => {}
            status => return Err(XconError::UnknownSetupStatus(status)),
        }
        let setup = Setup::deserialize(&mut parser)?;
        let (base, mask) = (setup.resource_id_base, setup.resource_id_mask);
        if mask == 0 || base & mask != 0 {
            return Err(XconError::InvalidResourceIds { base, mask });
        }
        log::debug!(
            "Connected to {} (protocol {}.{}, release {})",
            setup.vendor,
            setup.protocol_major_version,
            setup.protocol_minor_version,
            setup.release_number,
        );
        let data = Rc::new(XconData {
            transport: RefCell::new(transport),
            outgoing: Default::default(),
            next_serial: NumCell::new(1),
            last_recv_serial: Cell::new(0),
            reply_handlers: Default::default(),
            dead: Cell::new(false),
            need_sync: Cell::new(false),
            extensions: Default::default(),
            events: Default::default(),
            errors: Default::default(),
        });
        let extensions = match data.fetch_extension_data(registry) {
            Ok(ed) => ed,
            Err(e) => {
                data.kill();
                return Err(e);
            }
        };
        Ok(Self {
            extensions,
            xid_next: Cell::new(base),
            xid_inc: 1 << mask.trailing_zeros(),
            xid_max: base | mask,
            setup,
            data,
        })
    }

    /// Sends a request and returns a cookie for its reply.
    ///
    /// Errors caused by the request are delivered to the cookie.
    pub fn call<T: Request>(&self, t: &T) -> Cookie<T::Reply> {
        self.data.call(t, &self.extensions)
    }

    /// Sends a request without tracking its result.
    ///
    /// Replies are discarded. Errors are retrieved with `next_error`.
    pub fn send<T: Request>(&self, t: &T) -> Result<u64, XconError> {
        let serial = self.data.write_request(t, &self.extensions)?;
        self.data.need_sync.set(T::IS_VOID);
        Ok(serial)
    }

    pub fn flush(&self) -> Result<(), XconError> {
        if self.data.dead.get() {
            return Err(XconError::Dead);
        }
        let res = self.data.flush();
        if res.is_err() {
            self.data.kill();
        }
        res
    }

    /// Returns the next event that has already been read.
    pub fn poll_event(&self) -> Option<Event> {
        self.data.events.borrow_mut().pop_front()
    }

    /// Blocks until an event has been received.
    pub fn wait_event(&self) -> Result<Event, XconError> {
        loop {
            if let Some(event) = self.poll_event() {
                return Ok(event);
            }
            if self.data.dead.get() {
                return Err(XconError::Dead);
            }
            if let Err(e) = self.data.dispatch() {
                self.data.kill();
                return Err(e);
            }
        }
    }

    /// Returns the next error that could not be delivered to a cookie.
    pub fn next_error(&self) -> Option<XconError> {
        self.data.errors.borrow_mut().pop_front()
    }

    pub fn is_dead(&self) -> bool {
        self.data.dead.get()
    }

    /// Shuts down the connection and fails all pending cookies.
    pub fn close(&self) {
        self.data.kill();
    }
}

impl Drop for Xcon {
    fn drop(&mut self) {
        self.data.kill();
    }
}

impl XconData {
    fn kill(&self) {
        if !self.dead.replace(true) {
            self.transport.borrow_mut().shutdown();
        }
        self.outgoing.borrow_mut().clear();
        let handlers = mem::take(&mut *self.reply_handlers.borrow_mut());
        for handler in handlers {
            handler.handle_error(XconError::Dead);
        }
    }

    fn call<T: Request>(self: &Rc<Self>, t: &T, extensions: &ExtensionData) -> Cookie<T::Reply> {
        let serial = match self.write_request(t, extensions) {
            Ok(s) => s,
            Err(e) => return Cookie::failed(self, e),
        };
        let slot = Rc::new(ReplySlot {
            data: Cell::new(None),
        });
        let handler = Box::new(SlotReplyHandler {
            serial,
            is_void: T::IS_VOID,
            slot: Rc::downgrade(&slot),
        });
        self.reply_handlers.borrow_mut().push_back(handler);
        self.need_sync.set(T::IS_VOID);
        Cookie {
            serial,
            slot,
            data: self.clone(),
        }
    }

    fn write_request<T: Request>(&self, t: &T, extensions: &ExtensionData) -> Result<u64, XconError> {
        if self.dead.get() {
            return Err(XconError::Dead);
        }
        let (major, minor) = match T::EXTENSION {
            None => (T::OPCODE, 0),
            Some(ext) => match extensions.major_opcode(ext) {
                Some(o) => (o, T::OPCODE),
                _ => return Err(XconError::ExtensionUnavailable(ext.name())),
            },
        };
        let mut buf = self.outgoing.borrow_mut();
        let start = buf.len();
        let mut formatter = Formatter::new(&mut buf);
        formatter.write_packed(&major);
        formatter.write_packed(&minor);
        formatter.pad(2);
        t.serialize(&mut formatter);
        formatter.align(4);
        if let Err(e) = formatter.write_request_length(start) {
            buf.truncate(start);
            return Err(e);
        }
        Ok(self.next_serial.fetch_add(1))
    }

    fn send_sync(&self) {
        if !self.need_sync.replace(false) {
            return;
        }
        if let Err(e) = self.write_request(&GetInputFocus {}, &ExtensionData::default()) {
            log::error!("Could not send a sync request: {}", ErrorFmt(e));
        }
    }

    fn flush(&self) -> Result<(), XconError> {
        let buf = mem::take(&mut *self.outgoing.borrow_mut());
        if buf.is_empty() {
            return Ok(());
        }
        self.transport.borrow_mut().write_all(&buf)
    }

    /// Flushes outgoing requests and handles one incoming message.
    fn dispatch(&self) -> Result<(), XconError> {
        self.flush()?;
        handle_msg(self)
    }

    fn fetch_extension_data(
        self: &Rc<Self>,
        registry: &Registry,
    ) -> Result<Rc<ExtensionData>, XconError> {
        let mut ed = ExtensionData::default();
        let mut pending = vec![];
        for info in registry.iter() {
            let cookie = self.call(
                &QueryExtension {
                    name: info.name().into(),
                },
                &ed,
            );
            pending.push((info, cookie));
        }
        for (info, cookie) in pending {
            let data = match cookie.reply() {
                Ok(d) => d,
                Err(e) => return Err(XconError::QueryExtension(info.name(), Box::new(e))),
            };
            if data.present == 0 {
                log::debug!("The server does not support the `{}` extension", info.name());
                continue;
            }
            log::debug!(
                "Extension `{}`: opcode {}, first event {}, first error {}",
                info.name(),
                data.major_opcode,
                data.first_event,
                data.first_error,
            );
            let ext = info.extension;
            if data.first_event > 0 && info.num_events() > 0 {
                ed.events.push(ExtensionIdRange {
                    extension: ext,
                    first: data.first_event,
                    count: info.num_events(),
                });
            }
            if data.first_error > 0 && info.num_errors() > 0 {
                ed.errors.push(ExtensionIdRange {
                    extension: ext,
                    first: data.first_error,
                    count: info.num_errors(),
                });
            }
            ed.codes.insert(
                ext,
                ExtensionCodes {
                    major_opcode: data.major_opcode,
                    first_event: data.first_event,
                    first_error: data.first_error,
                },
            );
            ed.ext_by_opcode.insert(data.major_opcode, ext);
        }
        ed.events.sort_by_key(|e| e.first);
        ed.errors.sort_by_key(|e| e.first);
        let ed = Rc::new(ed);
        *self.extensions.borrow_mut() = ed.clone();
        Ok(ed)
    }
}

/// Parses a display of the form `:N` or `:N.S`.
pub fn parse_display(display: &str) -> Result<u32, XconError> {
    let num = match display.strip_prefix(":") {
        Some(p) => p,
        _ => return Err(XconError::InvalidDisplayFormat),
    };
    let num = match num.split_once('.') {
        Some((num, screen)) if screen.parse::<u32>().is_ok() => num,
        Some(_) => return Err(XconError::InvalidDisplayFormat),
        _ => num,
    };
    match num.parse() {
        Ok(v) => Ok(v),
        _ => Err(XconError::InvalidDisplayFormat),
    }
}

#[cfg(test)]
pub(crate) mod test_server;
