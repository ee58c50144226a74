// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Reads the same data through every kind of byte source.

use std::io::{self, Cursor, Read, Write};
use std::num::NonZero;

use bytesource::{AnySource, ByteArrayView, ByteSource, ChunkBuffer, SeekableReader, SourceReader, StreamingView};

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 253) as u8).collect()
}

fn drain(source: &mut impl ByteSource, request: usize) -> Vec<u8> {
    let mut collected = Vec::new();

    while let Some(window) = source.read_pointer(Some(request)) {
        assert!(window.len() <= request);
        let len = window.len();
        collected.extend_from_slice(window);
        source.advance(len).unwrap();
    }

    assert!(source.at_end());
    collected
}

#[test]
fn every_variant_reads_the_same_bytes() {
    let data = pattern(10_000);

    let mut array = AnySource::from_bytes(&data);
    assert_eq!(drain(&mut array, 4096), data);

    let mut cursor = Cursor::new(data.clone());
    let mut buffer = AnySource::from_stream(&mut cursor);
    assert!(matches!(buffer, AnySource::Buffer(_)));
    assert_eq!(drain(&mut buffer, 4096), data);

    let mut queue = ChunkBuffer::new();
    for chunk in data.chunks(3000) {
        queue.append(chunk.to_vec());
    }
    let mut chunks = AnySource::from_chunks(queue);
    assert_eq!(drain(&mut chunks, 4096), data);

    let mut file = SeekableReader::new(Cursor::new(data.clone())).unwrap();
    let mut stream = AnySource::from_stream(&mut file);
    assert!(matches!(stream, AnySource::Stream(_)));
    assert_eq!(drain(&mut stream, 4096), data);
}

#[test]
fn streaming_view_fills_scratch_buffer() {
    let data = pattern(50_000);
    let file = SeekableReader::new(Cursor::new(data.clone())).unwrap();

    let mut source = StreamingView::builder(file)
        .scratch_capacity(NonZero::new(16_384).unwrap())
        .build();

    let mut windows = Vec::new();
    let mut collected = Vec::new();

    while let Some(window) = source.read_pointer(None) {
        let len = window.len();
        windows.push(len);
        collected.extend_from_slice(window);
        source.advance(len).unwrap();
    }

    assert_eq!(windows, [16_384, 16_384, 16_384, 848]);
    assert_eq!(collected, data);
    assert_eq!(source.read_pointer(None), None);
}

#[test]
fn advance_beyond_window_skips_exactly_the_excess() {
    let data = pattern(1000);
    let file = SeekableReader::new(Cursor::new(data.clone())).unwrap();
    let mut source = StreamingView::new(file);

    assert_eq!(source.read_pointer(Some(100)), Some(&data[..100]));
    source.advance(150).unwrap();

    assert_eq!(source.total_advanced(), 150);
    assert_eq!(source.position(), Some(150));
    assert_eq!(source.read_pointer(Some(10)), Some(&data[150..160]));

    let file = source.into_source().into_inner();
    assert_eq!(file.position(), 160);
}

#[test]
fn reset_reads_again_from_the_start() {
    let data = pattern(300);
    let mut file = SeekableReader::new(Cursor::new(data.clone())).unwrap();
    let mut source = AnySource::from_stream(&mut file);

    assert_eq!(drain(&mut source, 64), data);

    source.reset().unwrap();
    assert_eq!(source.position(), Some(0));
    assert_eq!(drain(&mut source, 64), data);
}

#[test]
fn chunk_windows_never_cross_boundaries() {
    let mut queue = ChunkBuffer::new();
    queue.append(vec![1; 10]);
    queue.append(vec![2; 10]);
    queue.append(vec![3; 10]);

    let mut source = AnySource::from_chunks(queue);

    while let Some(window) = source.read_pointer(None) {
        assert!(window.len() <= 10);
        assert!(window.iter().all(|byte| *byte == window[0]));
        let len = window.len();
        source.advance(len).unwrap();
    }

    assert_eq!(source.position(), Some(30));
}

#[test]
fn reader_copies_out_of_any_source() {
    let data = pattern(5000);

    let mut queue = ChunkBuffer::new();
    queue.append(data[..1234].to_vec());
    queue.append(data[1234..].to_vec());

    let mut reader = AnySource::from_chunks(queue).into_reader();
    assert!(!reader.is_sequential());
    assert_eq!(reader.size(), 5000);

    let mut copied = Vec::new();
    reader.read_to_end(&mut copied).unwrap();
    assert_eq!(copied, data);

    assert_eq!(reader.write(b"nope").unwrap_err().kind(), io::ErrorKind::Unsupported);
}

#[test]
fn reader_over_borrowed_source() {
    let mut source = ByteArrayView::new(b"Hello, world");

    io::copy(&mut SourceReader::new(&mut source).take(5), &mut io::sink()).unwrap();

    assert_eq!(source.position(), Some(5));
    assert_eq!(source.read_pointer(None), Some(&b", world"[..]));
}
