mod web_request_case;
