//! Call marshalling against simulated peers and the in-process dispatcher

mod common;

use std::io;

use common::{
    AnswerResults, Calc, CalculatorCall, CalculatorClient, CalculatorProcedure, CalculatorReturn,
    CalculatorServer, Labeled, SumResults,
};
use lidl::{respond, root, Builder, Config, Error, Memory, Object};

/// Peer yang membangun response sendiri: sampah dulu, return union paling akhir
fn answering_peer(value: i32) -> impl FnMut(&[u8]) -> io::Result<Vec<u8>> {
    move |request: &[u8]| {
        let call = root::<CalculatorCall>(Memory::new(request.to_vec())).unwrap();
        assert_eq!(call.alternative().unwrap(), CalculatorProcedure::ANSWER);

        let mut b = Builder::new(Memory::zeroed(128));
        b.allocate(13, 1).unwrap();
        lidl::String::create(&mut b, "unrelated").unwrap();
        let results = AnswerResults::create(&mut b, value).unwrap();
        CalculatorReturn::create_answer(&mut b, results).unwrap();
        Ok(b.get().unwrap().to_vec())
    }
}

fn in_process(
    server: &mut CalculatorServer<Calc>,
) -> impl FnMut(&[u8]) -> io::Result<Vec<u8>> + '_ {
    let config = Config::default();
    move |request: &[u8]| {
        respond(&mut *server, request, &config)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))
    }
}

#[test]
fn test_zero_argument_call_reads_tail_return() {
    let mut client = CalculatorClient::new(answering_peer(1337));
    assert_eq!(client.answer().unwrap(), 1337);

    let mut client = CalculatorClient::new(answering_peer(-7));
    assert_eq!(client.answer().unwrap(), -7);
}

#[test]
fn test_return_envelope_is_last_in_response() {
    let mut peer = answering_peer(5);
    let mut b = Builder::new(Memory::zeroed(64));
    let params = common::AnswerParams::create(&mut b).unwrap();
    CalculatorCall::create_answer(&mut b, params).unwrap();
    let request = b.get().unwrap().to_vec();

    let response = peer(&request).unwrap();
    let size = <CalculatorReturn as Object>::SIZE;
    let tail = CalculatorReturn::from_memory(
        Memory::new(response.clone()).slice(response.len() - size, size).unwrap(),
    )
    .unwrap();
    assert_eq!(tail.answer().unwrap().ret0().unwrap().get(), 5);
}

#[test]
fn test_in_process_calls() {
    let mut server = CalculatorServer(Calc::default());
    {
        let mut client = CalculatorClient::new(in_process(&mut server));
        assert_eq!(client.add(40, 2).unwrap(), 42);
        assert_eq!(client.add(i32::MAX, 1).unwrap(), i32::MIN);
        assert_eq!(client.answer().unwrap(), 42);
        assert_eq!(client.echo("halo dunia").unwrap(), "HALO DUNIA");
        assert_eq!(client.echo("").unwrap(), "");
        assert_eq!(client.sum(&[1, 2, 3, 250]).unwrap(), 256);
        assert_eq!(client.sum(&[]).unwrap(), 0);
    }
    assert_eq!(server.0.calls, 7);
}

#[test]
fn test_object_argument_is_copied_into_request() {
    // argumen hidup di buffer lain; client harus deep copy ke request
    let mut elsewhere = Builder::new(Memory::zeroed(64));
    elsewhere.allocate(20, 1).unwrap();
    let name = lidl::String::create(&mut elsewhere, "sack").unwrap();
    let item = Labeled::create(&mut elsewhere, name, 100u16).unwrap();

    let mut server = CalculatorServer(Calc::default());
    let mut client = CalculatorClient::new(in_process(&mut server));
    assert_eq!(client.weigh(item.clone()).unwrap(), 104);

    // object asal tidak berubah
    assert_eq!(item.weight().unwrap().get(), 100);
}

#[test]
fn test_transport_error_is_propagated() {
    let refusing = |_: &[u8]| -> io::Result<Vec<u8>> {
        Err(io::Error::new(io::ErrorKind::ConnectionRefused, "peer gone"))
    };
    let mut client = CalculatorClient::new(refusing);
    match client.add(1, 2) {
        Err(Error::Transport(err)) => assert_eq!(err.kind(), io::ErrorKind::ConnectionRefused),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_short_response_is_rejected() {
    let truncated = |_: &[u8]| -> io::Result<Vec<u8>> { Ok(vec![0u8; 3]) };
    let mut client = CalculatorClient::new(truncated);
    assert!(matches!(client.answer(), Err(Error::OutOfBounds { .. })));
}

#[test]
fn test_wrong_return_alternative_is_rejected() {
    let wrong = |_: &[u8]| -> io::Result<Vec<u8>> {
        let mut b = Builder::new(Memory::zeroed(32));
        let results = SumResults::create(&mut b, 9u32).unwrap();
        CalculatorReturn::create_sum(&mut b, results).unwrap();
        Ok(b.get().unwrap().to_vec())
    };
    let mut client = CalculatorClient::new(wrong);
    match client.add(1, 2) {
        Err(Error::UnexpectedAlternative { expected, found }) => {
            assert_eq!(expected, "ADD");
            assert!(found.contains("SUM"));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_unknown_procedure_is_rejected() {
    let mut b = Builder::new(Memory::zeroed(32));
    let params = common::AnswerParams::create(&mut b).unwrap();
    let call = CalculatorCall::create_answer(&mut b, params).unwrap();
    // tag di luar tabel procedure
    call.memory().write(0, &[0x7f]).unwrap();
    let request = b.get().unwrap().to_vec();

    let mut server = CalculatorServer(Calc::default());
    match respond(&mut server, &request, &Config::default()) {
        Err(Error::UnknownProcedure(tag)) => assert!(tag.contains("127")),
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(server.0.calls, 0);
}

#[test]
fn test_scratch_capacity_limits_request() {
    let config = Config::default().with_scratch_capacity(16);
    let mut server = CalculatorServer(Calc::default());
    let mut client = CalculatorClient::with_config(in_process(&mut server), config);
    let long = "x".repeat(64);
    assert!(matches!(client.echo(&long), Err(Error::OutOfSpace { .. })));
}
