/// A named input of a benchmark group.
#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    input: &'static [u8],
}

impl TestCase {
    pub const fn new(name: &'static str, input: &'static [u8]) -> Self {
        Self { name, input }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn input(&self) -> &'static [u8] {
        self.input
    }

    pub fn len(&self) -> usize {
        self.input.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }
}

pub const GET_SMALL: TestCase = TestCase::new(
    "get_small",
    b"GET /api/fs/readtext?args=%22index.html%22 HTTP/1.1\r\nHost: localhost:4443\r\n\r\n",
);

pub const GET_LARGE: TestCase = TestCase::new(
    "get_large",
    b"GET /api/fs/readfolder?args=%22assets%2Fimages%22 HTTP/1.1\r\n\
Host: localhost:4443\r\n\
Connection: keep-alive\r\n\
sec-ch-ua: \"Chromium\";v=\"128\", \"Not;A=Brand\";v=\"24\"\r\n\
sec-ch-ua-mobile: ?0\r\n\
sec-ch-ua-platform: \"Linux\"\r\n\
User-Agent: Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/128.0.0.0 Safari/537.36\r\n\
Accept: */*\r\n\
Sec-Fetch-Site: same-origin\r\n\
Sec-Fetch-Mode: cors\r\n\
Sec-Fetch-Dest: empty\r\n\
Referer: https://localhost:4443/index.html\r\n\
Accept-Encoding: gzip, deflate, br, zstd\r\n\
Accept-Language: en-US,en;q=0.9\r\n\r\n",
);

pub const PUT_JSON: TestCase = TestCase::new(
    "put_json",
    b"PUT /api/fs/writefile HTTP/1.1\r\n\
Host: localhost:4443\r\n\
Content-Type: application/json\r\n\
Content-Length: 45\r\n\r\n\
{\"path\":\"notes/today.txt\",\"contents\":\"hello\"}",
);

pub const MULTIPART_SMALL: TestCase = TestCase::new(
    "multipart_small",
    b"--XyZ\r\n\
Content-Disposition: form-data; name=\"path\"\r\n\r\n\
notes/today.txt\r\n\
--XyZ\r\n\
Content-Disposition: form-data; name=\"contents\"\r\n\r\n\
hello\r\n\
--XyZ--\r\n",
);

pub const MULTIPART_BINARY: TestCase = TestCase::new(
    "multipart_binary",
    b"------WebKitFormBoundary7MA4YWxkTrZu0gW\r\n\
Content-Disposition: form-data; name=\"path\"\r\n\r\n\
images/logo.png\r\n\
------WebKitFormBoundary7MA4YWxkTrZu0gW\r\n\
Content-Disposition: form-data; name=\"contents\"\r\n\
Content-Type: application/octet-stream\r\n\r\n\
\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x10\0\0\0\x10\x08\x06\0\0\0\x1f\xf3\xffa\0\0\0\x19tEXtSoftware\0local-bridge\r\n\r\n\0\0\0\0IEND\xaeB`\x82\r\n\
------WebKitFormBoundary7MA4YWxkTrZu0gW--\r\n",
);
