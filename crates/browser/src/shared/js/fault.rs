/// Installed before any page script runs. Every `WebSocket` the page opens
/// fails right away with an error followed by an abnormal close (1006).
pub const BLOCK_LIVE_CHANNEL: &str = r#"
(() => {
    const BlockedSocket = function (url) {
        const ws = new EventTarget();
        ws.url = String(url);
        ws.readyState = 3;
        ws.bufferedAmount = 0;
        ws.protocol = '';
        ws.send = () => {};
        ws.close = () => {};
        setTimeout(() => {
            const err = new Event('error');
            if (typeof ws.onerror === 'function') ws.onerror(err);
            ws.dispatchEvent(err);
            const closed = new CloseEvent('close', { code: 1006, reason: 'blocked', wasClean: false });
            if (typeof ws.onclose === 'function') ws.onclose(closed);
            ws.dispatchEvent(closed);
        }, 0);
        return ws;
    };
    BlockedSocket.CONNECTING = 0;
    BlockedSocket.OPEN = 1;
    BlockedSocket.CLOSING = 2;
    BlockedSocket.CLOSED = 3;
    window.WebSocket = BlockedSocket;
    window.__vigilLiveChannelBlocked = true;
})();
"#;

pub const IS_LIVE_CHANNEL_BLOCKED: &str = r#"
() => window.__vigilLiveChannelBlocked === true
"#;
